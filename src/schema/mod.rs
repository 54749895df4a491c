//! In-memory schema graph: tables, columns, keys and foreign keys partitioned by (catalog, schema).

pub mod introspect;
pub mod postgres;
pub mod source;

pub use introspect::{introspect, introspect_database};
pub use postgres::PgMetadataSource;
pub use source::{MetadataSource, SchemaSnapshot, SnapshotSource};

use crate::error::IntrospectionError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Table identity. Tables with the same name in different schemas are different tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(catalog: Option<&str>, schema: Option<&str>, name: &str) -> Self {
        QualifiedName {
            catalog: catalog.map(String::from),
            schema: schema.map(String::from),
            name: name.to_string(),
        }
    }

    /// Unqualified name, for tests and single-schema snapshots.
    pub fn bare(name: &str) -> Self {
        QualifiedName::new(None, None, name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(c) = &self.catalog {
            write!(f, "{}.", c)?;
        }
        if let Some(s) = &self.schema {
            write!(f, "{}.", s)?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Database type name (e.g. `int4`, `varchar`).
    pub sql_type: String,
    #[serde(default)]
    pub size: Option<i32>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub local: String,
    pub referenced: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub referenced: QualifiedName,
    pub columns: Vec<ColumnPair>,
}

impl ForeignKey {
    pub fn local_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.local.as_str()).collect()
    }

    pub fn referenced_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.referenced.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub unique_keys: Vec<Vec<String>>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_primary_key_column(&self, name: &str) -> bool {
        self.primary_key.iter().any(|c| c == name)
    }
}

/// Introspected tables in introspection order. Every foreign key resolves inside the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaGraph {
    tables: Vec<Table>,
    index: HashMap<QualifiedName, usize>,
}

impl SchemaGraph {
    /// Build the graph, failing on keys that name unknown columns or tables.
    pub fn new(tables: Vec<Table>) -> Result<Self, IntrospectionError> {
        let index: HashMap<QualifiedName, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        for table in &tables {
            let known: HashSet<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
            let check = |column: &str, context: String| {
                if known.contains(column) {
                    Ok(())
                } else {
                    Err(IntrospectionError::UnknownColumn {
                        table: table.name.to_string(),
                        column: column.to_string(),
                        context,
                    })
                }
            };
            for pk in &table.primary_key {
                check(pk, "primary key".into())?;
            }
            for unique in &table.unique_keys {
                for col in unique {
                    check(col, "unique key".into())?;
                }
            }
            for fk in &table.foreign_keys {
                let Some(&target) = index.get(&fk.referenced) else {
                    return Err(IntrospectionError::DanglingForeignKey {
                        table: table.name.to_string(),
                        constraint: fk.name.clone(),
                        referenced: fk.referenced.to_string(),
                    });
                };
                let referenced = &tables[target];
                for pair in &fk.columns {
                    check(&pair.local, format!("foreign key {}", fk.name))?;
                    if referenced.column(&pair.referenced).is_none() {
                        return Err(IntrospectionError::UnknownColumn {
                            table: referenced.name.to_string(),
                            column: pair.referenced.clone(),
                            context: format!("foreign key {} of {}", fk.name, table.name),
                        });
                    }
                }
            }
        }
        Ok(SchemaGraph { tables, index })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &QualifiedName) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    /// Foreign keys on other tables (or self-references) pointing at `target`, in table order.
    pub fn referencing<'a>(&'a self, target: &'a QualifiedName) -> impl Iterator<Item = (&'a Table, &'a ForeignKey)> + 'a {
        self.tables.iter().flat_map(move |t| {
            t.foreign_keys
                .iter()
                .filter(move |fk| &fk.referenced == target)
                .map(move |fk| (t, fk))
        })
    }

    /// Distinct (catalog, schema) partitions present in the graph.
    pub fn partitions(&self) -> Vec<(Option<&str>, Option<&str>)> {
        let mut seen = Vec::new();
        for t in &self.tables {
            let key = (t.name.catalog.as_deref(), t.name.schema.as_deref());
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
