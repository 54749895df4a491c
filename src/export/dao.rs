//! Data-access exporter: one `<Type>Home.java` per entity.

use crate::config::ExporterSettings;
use crate::error::ExportError;
use crate::export::{export_entities, render_context, EntityView, Exporter, RenderOptions, TemplateSet, DAO_TEMPLATE};
use crate::model::EntityDescriptor;
use crate::typemap;
use std::collections::BTreeSet;
use std::path::PathBuf;

const ANNOTATED_IMPORTS: &[&str] = &[
    "java.util.List",
    "java.util.logging.Logger",
    "javax.ejb.Stateless",
    "javax.persistence.EntityManager",
    "javax.persistence.PersistenceContext",
];

const SESSION_IMPORTS: &[&str] = &["java.util.List", "java.util.logging.Logger", "org.hibernate.SessionFactory"];

pub struct DaoExporter {
    options: RenderOptions,
}

impl DaoExporter {
    pub fn new(options: RenderOptions) -> Self {
        DaoExporter { options }
    }
}

fn imports(entity: &EntityDescriptor, annotations: bool) -> BTreeSet<String> {
    let base = if annotations { ANNOTATED_IMPORTS } else { SESSION_IMPORTS };
    let mut imports: BTreeSet<String> = base.iter().map(|s| s.to_string()).collect();
    let mut ids = entity.id_fields();
    if let (Some(id), None) = (ids.next(), ids.next()) {
        if let (_, Some(import)) = typemap::simple_name(&id.java_type) {
            imports.insert(import);
        }
    }
    imports
}

impl Exporter for DaoExporter {
    fn name(&self) -> &'static str {
        "dao"
    }

    fn export(
        &self,
        entities: &[EntityDescriptor],
        settings: &ExporterSettings,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let templates = TemplateSet::load(settings.template_dir.as_deref())?;
        let annotations = self.options.annotations;
        let written = export_entities(
            &templates,
            DAO_TEMPLATE,
            entities,
            &settings.output_dir,
            |e| format!("{}Home.java", e.type_name),
            |e| render_context(&EntityView::new(e, imports(e, annotations)), &self.options),
        )?;
        tracing::info!(
            exporter = self.name(),
            files = written.len(),
            output = %settings.output_dir.display(),
            "export finished"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::*;
    use std::fs;

    fn export(annotations: bool, entities: &[EntityDescriptor]) -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let written = DaoExporter::new(RenderOptions::new(annotations))
            .export(
                entities,
                &ExporterSettings {
                    output_dir: dir.path().to_path_buf(),
                    template_dir: None,
                },
            )
            .unwrap();
        (dir, written)
    }

    #[test]
    fn entity_manager_homes_with_annotations() {
        let (dir, written) = export(true, &master_child_entities());
        assert_eq!(written[0], dir.path().join("com/acme/TabMasterHome.java"));
        let home = fs::read_to_string(&written[0]).unwrap();
        assert!(home.starts_with("package com.acme;"));
        assert!(home.contains("@Stateless"));
        assert!(home.contains("private EntityManager entityManager;"));
        assert!(home.contains("public TabMaster findById(String id)"));
        assert!(home.contains("import javax.persistence.PersistenceContext;"));
        assert!(!home.contains("SessionFactory"));
    }

    #[test]
    fn session_factory_homes_without_annotations() {
        let (_dir, written) = export(false, &master_child_entities());
        let home = fs::read_to_string(&written[1]).unwrap();
        assert!(home.contains("public class TabChildHome {"));
        assert!(home.contains("public TabChildHome(SessionFactory sessionFactory)"));
        assert!(home.contains("saveOrUpdate"));
        assert!(!home.contains("@Stateless"));
    }

    #[test]
    fn composite_key_lookup_uses_nested_id() {
        let (_dir, written) = export(true, &school_entities());
        let grade = fs::read_to_string(&written[2]).unwrap();
        assert!(grade.contains("public Grade findById(Grade.Id id)"));
        let student = fs::read_to_string(&written[0]).unwrap();
        assert!(student.contains("public Student findById(Long id)"));
    }

    #[test]
    fn qualified_id_type_is_imported() {
        let mut entities = master_child_entities();
        entities[0].fields[0].java_type = "java.util.UUID".into();
        let imports = imports(&entities[0], true);
        assert!(imports.contains("java.util.UUID"));
    }
}
