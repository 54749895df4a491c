//! Flat key/value settings with typed, defaulting accessors.

use crate::config::{SettingDefault, SettingKey};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Settings {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value, `None` when missing or blank.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// String value, or `default` when missing or blank.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.raw(key) {
            Some(v) => v.trim().to_string(),
            None => {
                tracing::warn!(key, default, "setting not found, using default");
                default.to_string()
            }
        }
    }

    /// Case-insensitive `true`; any other present value is `false`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(v) => v.trim().eq_ignore_ascii_case("true"),
            None => {
                tracing::warn!(key, default, "setting not found, using default");
                default
            }
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.raw(key) {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidInteger {
                key: key.to_string(),
                value: v.to_string(),
            }),
            None => {
                tracing::warn!(key, default, "setting not found, using default");
                Ok(default)
            }
        }
    }

    /// Schema-level string accessor. `None` for unset options without a default.
    pub fn string(&self, key: SettingKey) -> Option<String> {
        match key.default_value() {
            SettingDefault::Str(d) => Some(self.get_string(key.name(), d)),
            _ => self.raw(key.name()).map(|v| v.trim().to_string()),
        }
    }

    pub fn bool(&self, key: SettingKey) -> bool {
        let default = match key.default_value() {
            SettingDefault::Bool(b) => b,
            _ => false,
        };
        self.get_bool(key.name(), default)
    }

    pub fn int(&self, key: SettingKey) -> Result<i64, ConfigError> {
        let default = match key.default_value() {
            SettingDefault::Int(i) => i,
            _ => 0,
        };
        self.get_int(key.name(), default)
    }

    pub fn path(&self, key: SettingKey) -> Option<PathBuf> {
        self.string(key).map(PathBuf::from)
    }

    /// Comma-separated list; empty entries dropped. `None` when unset.
    pub fn list(&self, key: SettingKey) -> Option<Vec<String>> {
        self.raw(key.name()).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_blank_fall_back_to_default() {
        let s = Settings::from_pairs([("blank", "   "), ("empty", "")]);
        for key in ["missing", "blank", "empty"] {
            assert_eq!(s.get_string(key, "dflt"), "dflt");
            assert!(s.get_bool(key, true));
            assert!(!s.get_bool(key, false));
            assert_eq!(s.get_int(key, 7).unwrap(), 7);
        }
    }

    #[test]
    fn bool_parsing_never_fails() {
        let s = Settings::from_pairs([("a", "TRUE"), ("b", "True "), ("c", "yes"), ("d", "1"), ("e", "false")]);
        assert!(s.get_bool("a", false));
        assert!(s.get_bool("b", false));
        assert!(!s.get_bool("c", true));
        assert!(!s.get_bool("d", true));
        assert!(!s.get_bool("e", true));
    }

    #[test]
    fn malformed_integer_is_an_error() {
        let s = Settings::from_pairs([("n", "12"), ("bad", "12x")]);
        assert_eq!(s.get_int("n", 0).unwrap(), 12);
        match s.get_int("bad", 0) {
            Err(ConfigError::InvalidInteger { key, value }) => {
                assert_eq!(key, "bad");
                assert_eq!(value, "12x");
            }
            other => panic!("expected InvalidInteger, got {:?}", other),
        }
    }

    #[test]
    fn schema_accessors_use_documented_defaults() {
        let s = Settings::new();
        assert!(s.bool(SettingKey::IsPojo));
        assert!(!s.bool(SettingKey::IsDao));
        assert!(s.bool(SettingKey::ManyToMany));
        assert_eq!(s.string(SettingKey::Package).as_deref(), Some(""));
        assert_eq!(s.path(SettingKey::PojoOutputDirectory), Some(PathBuf::from(".")));
        assert_eq!(s.string(SettingKey::Schema), None);
        assert_eq!(s.int(SettingKey::ConnectionTimeout).unwrap(), 30);
        assert_eq!(s.list(SettingKey::IncludeTables), None);
    }

    #[test]
    fn list_splits_on_commas() {
        let s = Settings::from_pairs([("includeTables", " TabMaster, ,TabChild ")]);
        assert_eq!(
            s.list(SettingKey::IncludeTables),
            Some(vec!["TabMaster".to_string(), "TabChild".to_string()])
        );
    }
}
