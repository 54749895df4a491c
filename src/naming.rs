//! Identifier conversion for generated code: table -> type name, column -> field name, property names.

use std::path::PathBuf;

/// Split a database identifier into words on `_`, `-`, `.`, whitespace and lower->upper case changes.
fn words(s: &str) -> Vec<String> {
    let source = if s.chars().any(char::is_lowercase) {
        s.to_string()
    } else {
        // ALL_CAPS identifiers carry no case information.
        s.to_lowercase()
    };
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in source.chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        } else if c.is_uppercase() && prev_lower {
            out.push(std::mem::take(&mut current));
            current.push(c);
            prev_lower = false;
        } else {
            current.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Uppercase the first character, keep the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, keep the rest.
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// e.g. "tab_master" -> "TabMaster", "TAB_MASTER" -> "TabMaster"
pub fn to_upper_camel_case(s: &str) -> String {
    let mut out: String = words(s)
        .iter()
        .map(|w| capitalize(&normalize_word(w)))
        .collect();
    if out.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// e.g. "master_ref" -> "masterRef", "CHILDID" -> "childid"
pub fn to_lower_camel_case(s: &str) -> String {
    decapitalize(&to_upper_camel_case(s))
}

/// Words keep their inner casing, except all-caps words ("ID") which are lowered.
fn normalize_word(w: &str) -> String {
    if w.chars().count() > 1 && w.chars().all(|c| !c.is_lowercase()) {
        w.to_lowercase()
    } else {
        w.to_string()
    }
}

/// Java reserved words and literals; none may name a field or property.
const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "true", "try",
    "void", "volatile", "while", "_",
];

pub fn is_java_reserved(name: &str) -> bool {
    JAVA_RESERVED.contains(&name)
}

/// Append `_` to reserved words: "class" -> "class_".
pub fn escape_keyword(name: &str) -> String {
    if is_java_reserved(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Field name for a column: lower camel case, escaped when reserved.
pub fn property_name(column: &str) -> String {
    escape_keyword(&to_lower_camel_case(column))
}

/// Simple English plural for collection property names.
pub fn pluralize(s: &str) -> String {
    let lower = s.to_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        format!("{}es", s)
    } else if lower.ends_with('y') && !lower.ends_with("ay") && !lower.ends_with("ey") && !lower.ends_with("oy") && !lower.ends_with("uy") {
        format!("{}ies", &s[..s.len() - 1])
    } else {
        format!("{}s", s)
    }
}

/// Join column names into a suffix: ["master_ref", "id"] -> "MasterRefAndId"
pub fn columns_suffix(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| to_upper_camel_case(c))
        .collect::<Vec<_>>()
        .join("And")
}

/// "com.acme.model" -> "com/acme/model"; empty package -> empty path.
pub fn package_path(package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|p| !p.is_empty())
        .collect()
}
