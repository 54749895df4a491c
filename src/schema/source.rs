//! Database-metadata seam. The introspector only talks to a `MetadataSource`.

use crate::error::{ConfigError, IntrospectionError};
use crate::schema::{Column, ForeignKey, QualifiedName, SchemaGraph, Table};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generic metadata API in the shape of JDBC `DatabaseMetaData`: tables first, then per-table details.
#[async_trait]
pub trait MetadataSource: Send {
    /// Tables matching the optional filters, in a stable order.
    async fn tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<QualifiedName>, IntrospectionError>;

    /// Columns in ordinal order.
    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<Column>, IntrospectionError>;

    /// Primary key columns in key order; empty when the table has none.
    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>, IntrospectionError>;

    async fn unique_keys(&mut self, table: &QualifiedName) -> Result<Vec<Vec<String>>, IntrospectionError>;

    async fn foreign_keys(&mut self, table: &QualifiedName) -> Result<Vec<ForeignKey>, IntrospectionError>;
}

/// Serialized schema description, usable in place of a live connection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: Vec<Table>,
}

impl SchemaSnapshot {
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        SchemaSnapshot {
            tables: graph.tables().to_vec(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

pub struct SnapshotSource {
    snapshot: SchemaSnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        SnapshotSource { snapshot }
    }

    fn find(&self, table: &QualifiedName) -> Result<&Table, IntrospectionError> {
        self.snapshot
            .tables
            .iter()
            .find(|t| &t.name == table)
            .ok_or_else(|| IntrospectionError::Metadata {
                target: table.to_string(),
                message: "table not present in snapshot".into(),
            })
    }
}

fn matches(filter: Option<&str>, value: Option<&str>) -> bool {
    filter.map_or(true, |f| value == Some(f))
}

#[async_trait]
impl MetadataSource for SnapshotSource {
    async fn tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<QualifiedName>, IntrospectionError> {
        Ok(self
            .snapshot
            .tables
            .iter()
            .filter(|t| matches(catalog, t.name.catalog.as_deref()) && matches(schema, t.name.schema.as_deref()))
            .map(|t| t.name.clone())
            .collect())
    }

    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<Column>, IntrospectionError> {
        Ok(self.find(table)?.columns.clone())
    }

    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.find(table)?.primary_key.clone())
    }

    async fn unique_keys(&mut self, table: &QualifiedName) -> Result<Vec<Vec<String>>, IntrospectionError> {
        Ok(self.find(table)?.unique_keys.clone())
    }

    async fn foreign_keys(&mut self, table: &QualifiedName) -> Result<Vec<ForeignKey>, IntrospectionError> {
        Ok(self.find(table)?.foreign_keys.clone())
    }
}
