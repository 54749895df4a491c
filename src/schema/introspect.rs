//! Build a `SchemaGraph` from a metadata source.

use crate::config::ConnectionSettings;
use crate::error::{GenerateError, IntrospectionError};
use crate::schema::{MetadataSource, PgMetadataSource, SchemaGraph, Table};

/// Enumerate tables under the optional catalog/schema filters and assemble a validated graph.
pub async fn introspect(
    source: &mut dyn MetadataSource,
    catalog: Option<&str>,
    schema: Option<&str>,
) -> Result<SchemaGraph, IntrospectionError> {
    let names = source.tables(catalog, schema).await?;
    tracing::debug!(count = names.len(), catalog, schema, "tables found");

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = source.columns(&name).await?;
        let primary_key = source.primary_key(&name).await?;
        let unique_keys = source.unique_keys(&name).await?;
        let foreign_keys = source.foreign_keys(&name).await?;
        tracing::debug!(
            table = %name,
            columns = columns.len(),
            foreign_keys = foreign_keys.len(),
            "table introspected"
        );
        tables.push(Table {
            name,
            columns,
            primary_key,
            unique_keys,
            foreign_keys,
        });
    }

    let graph = SchemaGraph::new(tables)?;
    if catalog.is_none() && schema.is_none() && graph.partitions().len() > 1 {
        tracing::warn!(
            partitions = graph.partitions().len(),
            "no catalog or schema filter set and several schemas were found; set `schema` to avoid ambiguous type names"
        );
    }
    Ok(graph)
}

/// Connect, introspect, and release the connection on every exit path.
pub async fn introspect_database(
    settings: &ConnectionSettings,
    catalog: Option<&str>,
    schema: Option<&str>,
) -> Result<SchemaGraph, GenerateError> {
    let mut source = PgMetadataSource::connect(settings).await?;
    let result = introspect(&mut source, catalog, schema).await;
    source.close().await;
    Ok(result?)
}
