//! Resolved generation request: settings validated and flattened for one run.

use crate::config::{SettingKey, Settings};
use crate::error::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Heuristic toggles for the reverse-engineering strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyFlags {
    pub one_to_many: bool,
    pub many_to_one: bool,
    pub one_to_one: bool,
    pub many_to_many: bool,
    pub optimistic_lock: bool,
}

impl Default for StrategyFlags {
    fn default() -> Self {
        StrategyFlags {
            one_to_many: true,
            many_to_one: true,
            one_to_one: true,
            many_to_many: true,
            optimistic_lock: true,
        }
    }
}

/// Output location and template override for one exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExporterSettings {
    pub output_dir: PathBuf,
    /// Replaces the built-in template set entirely when present.
    pub template_dir: Option<PathBuf>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Where the schema graph comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaSource {
    Database(ConnectionSettings),
    Snapshot(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub source: SchemaSource,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub package: String,
    pub flags: StrategyFlags,
    /// Overrides the built-in optimistic-lock column name pattern.
    pub version_pattern: Option<String>,
    /// Generated type names to keep; `None` keeps every entity.
    pub include_tables: Option<Vec<String>>,
    pub annotations: bool,
    pub pojo: Option<ExporterSettings>,
    pub dao: Option<ExporterSettings>,
}

impl GenerationRequest {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let source = match settings.path(SettingKey::SchemaSnapshot) {
            Some(path) => SchemaSource::Snapshot(path),
            None => SchemaSource::Database(connection_settings(settings)?),
        };
        let flags = StrategyFlags {
            one_to_many: settings.bool(SettingKey::OneToMany),
            many_to_one: settings.bool(SettingKey::ManyToOne),
            one_to_one: settings.bool(SettingKey::OneToOne),
            many_to_many: settings.bool(SettingKey::ManyToMany),
            optimistic_lock: settings.bool(SettingKey::DetectOptimisticLock),
        };
        let pojo = settings.bool(SettingKey::IsPojo).then(|| ExporterSettings {
            output_dir: settings
                .path(SettingKey::PojoOutputDirectory)
                .unwrap_or_else(|| PathBuf::from(".")),
            template_dir: settings.path(SettingKey::PojoTemplatePath),
        });
        let dao = settings.bool(SettingKey::IsDao).then(|| ExporterSettings {
            output_dir: settings
                .path(SettingKey::DaoOutputDirectory)
                .unwrap_or_else(|| PathBuf::from(".")),
            template_dir: settings.path(SettingKey::DaoTemplatePath),
        });
        Ok(GenerationRequest {
            source,
            catalog: settings.string(SettingKey::Catalog),
            schema: settings.string(SettingKey::Schema),
            package: settings.string(SettingKey::Package).unwrap_or_default(),
            flags,
            version_pattern: settings.string(SettingKey::VersionColumnPattern),
            include_tables: settings.list(SettingKey::IncludeTables),
            annotations: settings.bool(SettingKey::IsAnnotation),
            pojo,
            dao,
        })
    }
}

fn connection_settings(settings: &Settings) -> Result<ConnectionSettings, ConfigError> {
    let url = settings
        .string(SettingKey::ConnectionUrl)
        .ok_or_else(|| ConfigError::Missing(SettingKey::ConnectionUrl.name().to_string()))?;
    let url = url.strip_prefix("jdbc:").unwrap_or(&url).to_string();
    let timeout = settings.int(SettingKey::ConnectionTimeout)?.max(1) as u64;
    Ok(ConnectionSettings {
        url,
        username: settings.string(SettingKey::ConnectionUsername),
        password: settings.string(SettingKey::ConnectionPassword),
        timeout: Duration::from_secs(timeout),
    })
}
