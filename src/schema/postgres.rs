//! PostgreSQL metadata over one exclusively owned connection (information_schema + pg_catalog).

use crate::config::ConnectionSettings;
use crate::error::{ConnectionError, IntrospectionError};
use crate::schema::{Column, ColumnPair, ForeignKey, MetadataSource, QualifiedName};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;

const TABLES_SQL: &str = r#"
SELECT table_catalog::text, table_schema::text, table_name::text
FROM information_schema.tables
WHERE table_type = 'BASE TABLE'
  AND table_schema NOT IN ('pg_catalog', 'information_schema')
  AND ($1::text IS NULL OR table_catalog = $1)
  AND ($2::text IS NULL OR table_schema = $2)
ORDER BY table_schema, table_name
"#;

const COLUMNS_SQL: &str = r#"
SELECT column_name::text,
       udt_name::text,
       character_maximum_length::int4,
       (is_nullable = 'YES') AS nullable,
       column_default::text
FROM information_schema.columns
WHERE ($1::text IS NULL OR table_catalog = $1)
  AND table_schema = $2
  AND table_name = $3
ORDER BY ordinal_position
"#;

const KEY_COLUMNS_SQL: &str = r#"
SELECT tc.constraint_name::text, kcu.column_name::text
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_catalog = tc.constraint_catalog
 AND kcu.constraint_schema = tc.constraint_schema
 AND kcu.constraint_name = tc.constraint_name
 AND kcu.table_name = tc.table_name
WHERE tc.constraint_type = $4
  AND ($1::text IS NULL OR tc.table_catalog = $1)
  AND tc.table_schema = $2
  AND tc.table_name = $3
ORDER BY tc.constraint_name, kcu.ordinal_position
"#;

const FOREIGN_KEYS_SQL: &str = r#"
SELECT con.conname::text,
       current_database()::text,
       nr.nspname::text,
       cr.relname::text,
       la.attname::text,
       ra.attname::text
FROM pg_constraint con
JOIN pg_class cl ON cl.oid = con.conrelid
JOIN pg_namespace nl ON nl.oid = cl.relnamespace
JOIN pg_class cr ON cr.oid = con.confrelid
JOIN pg_namespace nr ON nr.oid = cr.relnamespace
CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(local_attnum, ref_attnum, ord)
JOIN pg_attribute la ON la.attrelid = con.conrelid AND la.attnum = k.local_attnum
JOIN pg_attribute ra ON ra.attrelid = con.confrelid AND ra.attnum = k.ref_attnum
WHERE con.contype = 'f'
  AND ($1::text IS NULL OR current_database() = $1)
  AND nl.nspname = $2
  AND cl.relname = $3
ORDER BY con.conname, k.ord
"#;

pub struct PgMetadataSource {
    conn: PgConnection,
}

impl PgMetadataSource {
    /// Open the connection, bounded by the configured timeout.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let mut opts = PgConnectOptions::from_str(&settings.url)
            .map_err(|e| ConnectionError::InvalidUrl(e.to_string()))?;
        if let Some(user) = &settings.username {
            opts = opts.username(user);
        }
        if let Some(password) = &settings.password {
            opts = opts.password(password);
        }
        let database = database_name(&settings.url);
        tracing::debug!(database = %database, "connecting");
        let conn = tokio::time::timeout(settings.timeout, opts.connect())
            .await
            .map_err(|_| ConnectionError::Timeout {
                database: database.clone(),
                seconds: settings.timeout.as_secs(),
            })?
            .map_err(|source| ConnectionError::Connect {
                database: database.clone(),
                source,
            })?;
        tracing::info!(database = %database, "connected");
        Ok(PgMetadataSource { conn })
    }

    /// Release the connection. Dropping the source also releases it, without the graceful handshake.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            tracing::warn!(error = %e, "error while closing connection");
        }
    }
}

/// Database name from a connection url, for diagnostics only (never contains credentials).
fn database_name(url: &str) -> String {
    let Some(path_start) = url.rfind('/').map(|i| i + 1) else {
        return String::new();
    };
    url.get(path_start..)
        .unwrap_or("")
        .split('?')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn metadata_error(target: &QualifiedName, e: sqlx::Error) -> IntrospectionError {
    IntrospectionError::Metadata {
        target: target.to_string(),
        message: e.to_string(),
    }
}

impl PgMetadataSource {
    async fn key_columns(
        &mut self,
        table: &QualifiedName,
        constraint_type: &str,
    ) -> Result<Vec<(String, Vec<String>)>, IntrospectionError> {
        tracing::debug!(sql = %KEY_COLUMNS_SQL, table = %table, constraint_type, "query");
        let rows: Vec<(String, String)> = sqlx::query_as(KEY_COLUMNS_SQL)
            .bind(table.catalog.as_deref())
            .bind(table.schema.as_deref())
            .bind(&table.name)
            .bind(constraint_type)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| metadata_error(table, e))?;
        Ok(group_by_first(rows))
    }
}

/// Group ordered (key, value) rows by consecutive key, keeping first-seen order.
fn group_by_first<T>(rows: Vec<(String, T)>) -> Vec<(String, Vec<T>)> {
    let mut out: Vec<(String, Vec<T>)> = Vec::new();
    for (key, value) in rows {
        match out.last_mut() {
            Some((last, values)) if *last == key => values.push(value),
            _ => out.push((key, vec![value])),
        }
    }
    out
}

#[async_trait]
impl MetadataSource for PgMetadataSource {
    async fn tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<QualifiedName>, IntrospectionError> {
        tracing::debug!(sql = %TABLES_SQL, "query");
        let rows: Vec<(String, String, String)> = sqlx::query_as(TABLES_SQL)
            .bind(catalog)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| IntrospectionError::Metadata {
                target: format!("tables of {}.{}", catalog.unwrap_or("*"), schema.unwrap_or("*")),
                message: e.to_string(),
            })?;
        Ok(rows
            .into_iter()
            .map(|(c, s, t)| QualifiedName {
                catalog: Some(c),
                schema: Some(s),
                name: t,
            })
            .collect())
    }

    async fn columns(&mut self, table: &QualifiedName) -> Result<Vec<Column>, IntrospectionError> {
        tracing::debug!(sql = %COLUMNS_SQL, table = %table, "query");
        let rows: Vec<(String, String, Option<i32>, bool, Option<String>)> = sqlx::query_as(COLUMNS_SQL)
            .bind(table.catalog.as_deref())
            .bind(table.schema.as_deref())
            .bind(&table.name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| metadata_error(table, e))?;
        Ok(rows
            .into_iter()
            .map(|(name, sql_type, size, nullable, default)| Column {
                name,
                sql_type,
                size,
                nullable,
                default,
            })
            .collect())
    }

    async fn primary_key(&mut self, table: &QualifiedName) -> Result<Vec<String>, IntrospectionError> {
        let keys = self.key_columns(table, "PRIMARY KEY").await?;
        Ok(keys.into_iter().next().map(|(_, cols)| cols).unwrap_or_default())
    }

    async fn unique_keys(&mut self, table: &QualifiedName) -> Result<Vec<Vec<String>>, IntrospectionError> {
        let keys = self.key_columns(table, "UNIQUE").await?;
        Ok(keys.into_iter().map(|(_, cols)| cols).collect())
    }

    async fn foreign_keys(&mut self, table: &QualifiedName) -> Result<Vec<ForeignKey>, IntrospectionError> {
        tracing::debug!(sql = %FOREIGN_KEYS_SQL, table = %table, "query");
        let rows: Vec<(String, String, String, String, String, String)> = sqlx::query_as(FOREIGN_KEYS_SQL)
            .bind(table.catalog.as_deref())
            .bind(table.schema.as_deref())
            .bind(&table.name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| metadata_error(table, e))?;
        let grouped = group_by_first(
            rows.into_iter()
                .map(|(con, cat, schema, rel, local, referenced)| (con, (cat, schema, rel, local, referenced)))
                .collect(),
        );
        Ok(grouped
            .into_iter()
            .filter_map(|(name, parts)| {
                let (cat, schema, rel, _, _) = parts.first()?.clone();
                Some(ForeignKey {
                    name,
                    referenced: QualifiedName {
                        catalog: Some(cat),
                        schema: Some(schema),
                        name: rel,
                    },
                    columns: parts
                        .into_iter()
                        .map(|(_, _, _, local, referenced)| ColumnPair { local, referenced })
                        .collect(),
                })
            })
            .collect())
    }
}
