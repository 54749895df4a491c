//! Settings schema: every recognized option with its kind and default.

/// Value kind of a setting, used for load-time validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
    String,
    Bool,
    Int,
    Path,
    /// Comma-separated list.
    List,
}

/// Default value of a setting. `None` means the option is unset unless configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingDefault {
    None,
    Str(&'static str),
    Bool(bool),
    Int(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    IsPojo,
    IsDao,
    IncludeTables,
    Catalog,
    Schema,
    Package,
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
    DetectOptimisticLock,
    IsAnnotation,
    PojoOutputDirectory,
    DaoOutputDirectory,
    PojoTemplatePath,
    DaoTemplatePath,
    ConnectionUrl,
    ConnectionUsername,
    ConnectionPassword,
    ConnectionTimeout,
    SchemaSnapshot,
    VersionColumnPattern,
}

impl SettingKey {
    pub const ALL: &'static [SettingKey] = &[
        SettingKey::IsPojo,
        SettingKey::IsDao,
        SettingKey::IncludeTables,
        SettingKey::Catalog,
        SettingKey::Schema,
        SettingKey::Package,
        SettingKey::OneToMany,
        SettingKey::ManyToOne,
        SettingKey::OneToOne,
        SettingKey::ManyToMany,
        SettingKey::DetectOptimisticLock,
        SettingKey::IsAnnotation,
        SettingKey::PojoOutputDirectory,
        SettingKey::DaoOutputDirectory,
        SettingKey::PojoTemplatePath,
        SettingKey::DaoTemplatePath,
        SettingKey::ConnectionUrl,
        SettingKey::ConnectionUsername,
        SettingKey::ConnectionPassword,
        SettingKey::ConnectionTimeout,
        SettingKey::SchemaSnapshot,
        SettingKey::VersionColumnPattern,
    ];

    /// Property name as written in the settings file (after prefix normalization).
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::IsPojo => "isPojo",
            SettingKey::IsDao => "isDao",
            SettingKey::IncludeTables => "includeTables",
            SettingKey::Catalog => "catalog",
            SettingKey::Schema => "schema",
            SettingKey::Package => "package",
            SettingKey::OneToMany => "one2many",
            SettingKey::ManyToOne => "many2one",
            SettingKey::OneToOne => "one2one",
            SettingKey::ManyToMany => "many2many",
            SettingKey::DetectOptimisticLock => "detectOptimisticLock",
            SettingKey::IsAnnotation => "isAnnotation",
            SettingKey::PojoOutputDirectory => "pojo.outputDirectory",
            SettingKey::DaoOutputDirectory => "dao.outputDirectory",
            SettingKey::PojoTemplatePath => "pojo.templatePath",
            SettingKey::DaoTemplatePath => "dao.templatePath",
            SettingKey::ConnectionUrl => "connection.url",
            SettingKey::ConnectionUsername => "connection.username",
            SettingKey::ConnectionPassword => "connection.password",
            SettingKey::ConnectionTimeout => "connection.timeout",
            SettingKey::SchemaSnapshot => "schemaSnapshot",
            SettingKey::VersionColumnPattern => "versionColumnPattern",
        }
    }

    pub fn kind(self) -> SettingKind {
        match self {
            SettingKey::IsPojo
            | SettingKey::IsDao
            | SettingKey::OneToMany
            | SettingKey::ManyToOne
            | SettingKey::OneToOne
            | SettingKey::ManyToMany
            | SettingKey::DetectOptimisticLock
            | SettingKey::IsAnnotation => SettingKind::Bool,
            SettingKey::IncludeTables => SettingKind::List,
            SettingKey::ConnectionTimeout => SettingKind::Int,
            SettingKey::PojoOutputDirectory
            | SettingKey::DaoOutputDirectory
            | SettingKey::PojoTemplatePath
            | SettingKey::DaoTemplatePath
            | SettingKey::SchemaSnapshot => SettingKind::Path,
            SettingKey::Catalog
            | SettingKey::Schema
            | SettingKey::Package
            | SettingKey::ConnectionUrl
            | SettingKey::ConnectionUsername
            | SettingKey::ConnectionPassword
            | SettingKey::VersionColumnPattern => SettingKind::String,
        }
    }

    pub fn default_value(self) -> SettingDefault {
        match self {
            SettingKey::IsPojo => SettingDefault::Bool(true),
            SettingKey::IsDao => SettingDefault::Bool(false),
            SettingKey::OneToMany
            | SettingKey::ManyToOne
            | SettingKey::OneToOne
            | SettingKey::ManyToMany
            | SettingKey::DetectOptimisticLock
            | SettingKey::IsAnnotation => SettingDefault::Bool(true),
            SettingKey::Package => SettingDefault::Str(""),
            SettingKey::PojoOutputDirectory | SettingKey::DaoOutputDirectory => SettingDefault::Str("."),
            SettingKey::ConnectionTimeout => SettingDefault::Int(30),
            SettingKey::IncludeTables
            | SettingKey::Catalog
            | SettingKey::Schema
            | SettingKey::PojoTemplatePath
            | SettingKey::DaoTemplatePath
            | SettingKey::ConnectionUrl
            | SettingKey::ConnectionUsername
            | SettingKey::ConnectionPassword
            | SettingKey::SchemaSnapshot
            | SettingKey::VersionColumnPattern => SettingDefault::None,
        }
    }

    pub fn from_name(name: &str) -> Option<SettingKey> {
        SettingKey::ALL.iter().copied().find(|k| k.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_name(key.name()), Some(*key));
        }
        assert_eq!(SettingKey::from_name("custom.isPojo"), None);
    }

    #[test]
    fn defaults_match_kinds() {
        for key in SettingKey::ALL {
            match (key.kind(), key.default_value()) {
                (SettingKind::Bool, SettingDefault::Bool(_)) => {}
                (SettingKind::Int, SettingDefault::Int(_)) => {}
                (SettingKind::String | SettingKind::Path, SettingDefault::Str(_)) => {}
                (_, SettingDefault::None) => {}
                other => panic!("{:?} has mismatched default {:?}", key, other),
            }
        }
    }

    #[test]
    fn generation_defaults() {
        assert_eq!(SettingKey::IsPojo.default_value(), SettingDefault::Bool(true));
        assert_eq!(SettingKey::IsDao.default_value(), SettingDefault::Bool(false));
        assert_eq!(SettingKey::Package.default_value(), SettingDefault::Str(""));
    }
}
