//! Load settings from a `.properties` file, a `hibernate.cfg.xml` file, or a string.

use crate::config::{validate, Settings};
use crate::error::ConfigError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::path::Path;

/// Prefixes stripped from keys: `custom.` from older generator files, `hibernate.` from connection keys.
const KEY_PREFIXES: &[&str] = &["custom.", "hibernate."];

/// Read, parse and validate a settings file. `*.xml` is read as `hibernate.cfg.xml`, anything
/// else as `.properties`. A missing file is fatal.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        tracing::error!(path = %path.display(), "settings file not found");
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_xml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"));
    let settings = if is_xml {
        parse_cfg_xml_settings(&text)?
    } else {
        parse_settings(&text)?
    };
    tracing::debug!(path = %path.display(), count = settings.len(), xml = is_xml, "settings loaded");
    Ok(settings)
}

/// Parse and validate settings from properties text.
pub fn parse_settings(text: &str) -> Result<Settings, ConfigError> {
    settings_from_pairs(parse_properties(text))
}

/// Parse and validate settings from a `hibernate.cfg.xml` document.
pub fn parse_cfg_xml_settings(text: &str) -> Result<Settings, ConfigError> {
    settings_from_pairs(parse_cfg_xml(text)?)
}

fn settings_from_pairs(pairs: Vec<(String, String)>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::new();
    for (key, value) in pairs {
        settings.insert(normalize_key(&key), value);
    }
    validate(&settings)?;
    Ok(settings)
}

/// Collect `<property name="...">value</property>` pairs in document order. Other elements
/// (`mapping`, `class-cache`, ...) are ignored; values are trimmed.
pub fn parse_cfg_xml(text: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut reader = Reader::from_str(text);
    let mut out = Vec::new();
    let mut current: Option<(String, String)> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"property" => {
                current = Some((name_attribute(&e)?, String::new()));
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"property" => {
                out.push((name_attribute(&e)?, String::new()));
            }
            Ok(Event::Text(e)) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"property" => {
                if let Some((key, value)) = current.take() {
                    out.push((key, value.trim().to_string()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(e)),
        }
    }
    Ok(out)
}

fn name_attribute(element: &BytesStart) -> Result<String, ConfigError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == b"name" {
            return Ok(attr.unescape_value().map_err(xml_error)?.trim().to_string());
        }
    }
    Err(ConfigError::Xml("<property> without a name attribute".to_string()))
}

fn xml_error(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Xml(e.to_string())
}

pub fn normalize_key(key: &str) -> String {
    KEY_PREFIXES
        .iter()
        .find_map(|p| key.strip_prefix(p))
        .unwrap_or(key)
        .to_string()
}

/// Parse `.properties` text into ordered (key, value) pairs. Later duplicates are kept; the caller decides.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        out.push(split_key_value(&logical));
    }
    out
}

/// Odd number of trailing backslashes means the line continues.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut key_end = chars.len();
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = i;
                break;
            }
            _ => i += 1,
        }
    }
    let key: String = chars[..key_end.min(chars.len())].iter().collect();
    let mut j = key_end;
    while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\u{c}') {
        j += 1;
    }
    if j < chars.len() && matches!(chars[j], '=' | ':') {
        j += 1;
    }
    while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\u{c}') {
        j += 1;
    }
    let value: String = chars[j.min(chars.len())..].iter().collect();
    (unescape(&key), unescape(value.trim_end()))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
