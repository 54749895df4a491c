//! Load-time validation of settings against the schema.

use crate::config::{SettingKey, SettingKind, Settings};
use crate::error::ConfigError;

/// Validate once at load: integers and patterns must parse, odd booleans and unknown keys are reported.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    for (key, value) in settings.iter() {
        let Some(setting) = SettingKey::from_name(key) else {
            tracing::debug!(key, "ignoring unrecognized setting");
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match setting.kind() {
            SettingKind::Int => {
                value.parse::<i64>().map_err(|_| ConfigError::InvalidInteger {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            SettingKind::Bool => {
                if !value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false") {
                    tracing::warn!(key, value, "boolean setting is neither true nor false, treating as false");
                }
            }
            SettingKind::String if setting == SettingKey::VersionColumnPattern => {
                regex::Regex::new(value).map_err(|e| ConfigError::InvalidPattern {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            }
            SettingKind::String | SettingKind::Path | SettingKind::List => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_settings() {
        let s = Settings::from_pairs([
            ("isPojo", "true"),
            ("isDao", "maybe"),
            ("connection.timeout", " 15 "),
            ("unknownKey", "whatever"),
            ("connection.url", ""),
        ]);
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn rejects_malformed_integer() {
        let s = Settings::from_pairs([("connection.timeout", "3.5")]);
        match validate(&s) {
            Err(ConfigError::InvalidInteger { key, .. }) => assert_eq!(key, "connection.timeout"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_version_pattern() {
        let s = Settings::from_pairs([("versionColumnPattern", "(version")]);
        assert!(matches!(validate(&s), Err(ConfigError::InvalidPattern { .. })));
        let s = Settings::from_pairs([("versionColumnPattern", "(?i)^rev$")]);
        assert!(validate(&s).is_ok());
    }
}
