//! Typed errors for each pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("setting '{key}' is not an integer: '{value}'")]
    InvalidInteger { key: String, value: String },
    #[error("setting '{key}' is not a valid pattern: {message}")]
    InvalidPattern { key: String, message: String },
    #[error("invalid hibernate.cfg.xml: {0}")]
    Xml(String),
    #[error("missing required setting: {0}")]
    Missing(String),
    #[error("schema snapshot {}: {message}", path.display())]
    Snapshot { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),
    #[error("cannot connect to {database}: {source}")]
    Connect {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("connection to {database} timed out after {seconds}s")]
    Timeout { database: String, seconds: u64 },
}

#[derive(Error, Debug)]
pub enum IntrospectionError {
    #[error("table {table}: foreign key {constraint} references {referenced}, which was not introspected")]
    DanglingForeignKey {
        table: String,
        constraint: String,
        referenced: String,
    },
    #[error("table {table}: {context} names unknown column {column}")]
    UnknownColumn {
        table: String,
        column: String,
        context: String,
    },
    #[error("tables {first} and {second} both map to type {type_name}; restrict the schema or the include list")]
    ConflictingTypeName {
        type_name: String,
        first: String,
        second: String,
    },
    #[error("metadata query failed for {target}: {message}")]
    Metadata { target: String, message: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("template directory {} does not exist", path.display())]
    TemplateDirectory { path: PathBuf },
    #[error("cannot load templates: {0}")]
    Template(#[source] tera::Error),
    #[error("cannot render {template} for {entity}: {source}")]
    Render {
        template: String,
        entity: String,
        #[source]
        source: tera::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a whole generation run.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}
