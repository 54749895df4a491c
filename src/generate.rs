//! Pipeline entry points: resolve source -> introspect -> classify -> build -> export.

use crate::config::{ExporterSettings, GenerationRequest, SchemaSource};
use crate::error::{ExportError, GenerateError};
use crate::export::{DaoExporter, Exporter, PojoExporter, RenderOptions};
use crate::model::{build, EntityDescriptor, ReverseEngineeringStrategy};
use crate::schema::{introspect, introspect_database, MetadataSource, SchemaGraph, SchemaSnapshot, SnapshotSource};
use std::path::PathBuf;

/// Result of one exporter run.
#[derive(Debug)]
pub struct ExportOutcome {
    pub exporter: &'static str,
    pub result: Result<Vec<PathBuf>, ExportError>,
}

#[derive(Debug)]
pub struct GenerationReport {
    /// Entities handed to the exporters.
    pub entities: Vec<EntityDescriptor>,
    /// One entry per exporter that ran, in run order (POJO before DAO).
    pub outcomes: Vec<ExportOutcome>,
}

impl GenerationReport {
    /// True when every requested exporter completed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn written_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &ExportError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.exporter, e)))
    }
}

/// Introspect the request's schema source. The database connection is closed before this returns.
pub async fn load_graph(request: &GenerationRequest) -> Result<SchemaGraph, GenerateError> {
    let catalog = request.catalog.as_deref();
    let schema = request.schema.as_deref();
    match &request.source {
        SchemaSource::Database(connection) => introspect_database(connection, catalog, schema).await,
        SchemaSource::Snapshot(path) => {
            tracing::info!(path = %path.display(), "reading schema snapshot");
            let mut source = SnapshotSource::new(SchemaSnapshot::load(path)?);
            Ok(introspect(&mut source, catalog, schema).await?)
        }
    }
}

/// Classify and filter: the entity list the exporters would see.
pub fn entities(request: &GenerationRequest, graph: &SchemaGraph) -> Result<Vec<EntityDescriptor>, GenerateError> {
    let strategy = ReverseEngineeringStrategy::from_request(request)?;
    Ok(build(graph, &strategy, request.include_tables.as_deref())?)
}

/// Run each enabled exporter. A failing exporter does not stop the other.
pub fn export(request: &GenerationRequest, entities: Vec<EntityDescriptor>) -> GenerationReport {
    let options = RenderOptions::new(request.annotations);
    let mut exporters: Vec<(Box<dyn Exporter>, &ExporterSettings)> = Vec::new();
    if let Some(settings) = &request.pojo {
        exporters.push((Box::new(PojoExporter::new(options.clone())) as Box<dyn Exporter>, settings));
    }
    if let Some(settings) = &request.dao {
        exporters.push((Box::new(DaoExporter::new(options)) as Box<dyn Exporter>, settings));
    }
    if exporters.is_empty() {
        tracing::warn!("neither isPojo nor isDao is enabled; nothing to generate");
    }

    let outcomes = exporters
        .into_iter()
        .map(|(exporter, settings)| {
            let result = exporter.export(&entities, settings);
            if let Err(e) = &result {
                tracing::error!(exporter = exporter.name(), error = %e, "export failed");
            }
            ExportOutcome {
                exporter: exporter.name(),
                result,
            }
        })
        .collect();
    GenerationReport { entities, outcomes }
}

/// Full pipeline against the request's configured source.
pub async fn generate(request: &GenerationRequest) -> Result<GenerationReport, GenerateError> {
    let graph = load_graph(request).await?;
    let entities = entities(request, &graph)?;
    Ok(export(request, entities))
}

/// Full pipeline against a caller-supplied metadata source; `request.source` is ignored.
pub async fn generate_with_source(
    request: &GenerationRequest,
    source: &mut dyn MetadataSource,
) -> Result<GenerationReport, GenerateError> {
    let graph = introspect(source, request.catalog.as_deref(), request.schema.as_deref()).await?;
    let entities = entities(request, &graph)?;
    Ok(export(request, entities))
}

/// Introspection and classification only; nothing is written.
pub async fn inspect(request: &GenerationRequest) -> Result<Vec<EntityDescriptor>, GenerateError> {
    let graph = load_graph(request).await?;
    entities(request, &graph)
}

/// Capture the introspected schema as a snapshot for offline runs.
pub async fn snapshot(request: &GenerationRequest) -> Result<SchemaSnapshot, GenerateError> {
    let graph = load_graph(request).await?;
    Ok(SchemaSnapshot::from_graph(&graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyFlags;
    use crate::error::IntrospectionError;
    use crate::schema::fixtures::master_child;

    fn request(dir: &std::path::Path, dao: bool) -> GenerationRequest {
        GenerationRequest {
            source: SchemaSource::Snapshot(dir.join("schema.json")),
            catalog: None,
            schema: None,
            package: "com.acme".into(),
            flags: StrategyFlags::default(),
            version_pattern: None,
            include_tables: None,
            annotations: true,
            pojo: Some(ExporterSettings {
                output_dir: dir.join("pojo"),
                template_dir: None,
            }),
            dao: dao.then(|| ExporterSettings {
                output_dir: dir.join("dao"),
                template_dir: None,
            }),
        }
    }

    #[tokio::test]
    async fn generate_with_source_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), true);
        let mut source = SnapshotSource::new(SchemaSnapshot { tables: master_child() });
        let report = generate_with_source(&req, &mut source).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.entities.len(), 2);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.written_files().count(), 4);
        assert!(dir.path().join("dao/com/acme/TabChildHome.java").is_file());
    }

    #[tokio::test]
    async fn failing_exporter_does_not_stop_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path(), true);
        if let Some(pojo) = req.pojo.as_mut() {
            pojo.template_dir = Some(dir.path().join("missing-templates"));
        }
        let mut source = SnapshotSource::new(SchemaSnapshot { tables: master_child() });
        let report = generate_with_source(&req, &mut source).await.unwrap();
        assert!(!report.is_success());
        let failures: Vec<_> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["pojo"]);
        assert!(dir.path().join("dao/com/acme/TabMasterHome.java").is_file());
        assert!(!dir.path().join("pojo").exists());
    }

    #[tokio::test]
    async fn snapshot_source_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SchemaSnapshot { tables: master_child() };
        std::fs::write(dir.path().join("schema.json"), serde_json::to_string(&snapshot).unwrap()).unwrap();
        let req = request(dir.path(), false);

        let entities = inspect(&req).await.unwrap();
        let names: Vec<_> = entities.iter().map(|e| e.type_name.as_str()).collect();
        assert_eq!(names, vec!["TabMaster", "TabChild"]);
        assert_eq!(super::snapshot(&req).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn missing_snapshot_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(&request(dir.path(), false)).await.unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }

    #[tokio::test]
    async fn invalid_version_pattern_aborts_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path(), false);
        req.version_pattern = Some("(".into());
        let mut source = SnapshotSource::new(SchemaSnapshot { tables: master_child() });
        let err = generate_with_source(&req, &mut source).await.unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
        assert!(!dir.path().join("pojo").exists());
    }

    #[tokio::test]
    async fn same_table_in_two_schemas_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), true);
        let mut tables = master_child();
        let mut archived = tables[0].clone();
        archived.name.schema = Some("archive".into());
        tables.push(archived);
        let mut source = SnapshotSource::new(SchemaSnapshot { tables });

        let err = generate_with_source(&req, &mut source).await.unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Introspection(IntrospectionError::ConflictingTypeName { .. })
        ));
        assert!(!dir.path().join("pojo").exists());
        assert!(!dir.path().join("dao").exists());
    }
}
