//! reveng-tools: properties-driven schema reverse engineering that emits POJO and DAO sources.

pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod model;
pub mod naming;
pub mod schema;
pub mod typemap;

pub use config::{load_settings, GenerationRequest, SchemaSource, SettingKey, Settings, StrategyFlags};
pub use error::{ConfigError, ConnectionError, ExportError, GenerateError, IntrospectionError};
pub use export::{DaoExporter, Exporter, PojoExporter, RenderOptions, TemplateSet};
pub use generate::{generate, generate_with_source, inspect, snapshot, ExportOutcome, GenerationReport};
pub use model::{build, EntityDescriptor, ReverseEngineeringStrategy};
pub use schema::{introspect, MetadataSource, PgMetadataSource, SchemaGraph, SchemaSnapshot, SnapshotSource};
