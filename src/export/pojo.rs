//! Data-object exporter: one `<Type>.java` per entity.

use crate::config::ExporterSettings;
use crate::error::ExportError;
use crate::export::{
    export_entities, field_type_imports, render_context, EntityView, Exporter, RenderOptions, TemplateSet,
    POJO_TEMPLATE,
};
use crate::model::{AssociationKind, EntityDescriptor};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub struct PojoExporter {
    options: RenderOptions,
}

impl PojoExporter {
    pub fn new(options: RenderOptions) -> Self {
        PojoExporter { options }
    }
}

fn persistence(name: &str) -> String {
    format!("javax.persistence.{}", name)
}

/// Imports for the data object: field types, collections, composite-key helpers and the JPA annotations in use.
fn imports(entity: &EntityDescriptor, annotations: bool) -> BTreeSet<String> {
    let mut imports = field_type_imports(entity);
    imports.insert("java.io.Serializable".to_string());
    if entity.associations.iter().any(|a| a.kind.is_collection()) {
        imports.insert("java.util.HashSet".to_string());
        imports.insert("java.util.Set".to_string());
    }
    if entity.has_composite_id() {
        imports.insert("java.util.Objects".to_string());
    }
    if !annotations {
        return imports;
    }

    for name in ["Entity", "Table", "Column"] {
        imports.insert(persistence(name));
    }
    if entity.id_fields().next().is_some() {
        imports.insert(persistence("Id"));
    }
    if entity.has_composite_id() {
        imports.insert(persistence("IdClass"));
    }
    if entity.version_field.is_some() {
        imports.insert(persistence("Version"));
    }
    for assoc in &entity.associations {
        imports.insert(persistence("FetchType"));
        imports.insert(persistence(match assoc.kind {
            AssociationKind::ManyToOne => "ManyToOne",
            AssociationKind::OneToMany => "OneToMany",
            AssociationKind::OneToOne => "OneToOne",
            AssociationKind::ManyToMany => "ManyToMany",
        }));
        if assoc.join_table.is_some() {
            imports.insert(persistence("JoinTable"));
            imports.insert(persistence("JoinColumn"));
        } else if assoc.mapped_by.is_none() && assoc.kind != AssociationKind::ManyToMany {
            imports.insert(persistence("JoinColumn"));
            if assoc.columns.len() > 1 {
                imports.insert(persistence("JoinColumns"));
            }
        }
    }
    imports
}

impl Exporter for PojoExporter {
    fn name(&self) -> &'static str {
        "pojo"
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
            POJO_TEMPLATE,
            entities,
            &settings.output_dir,
            |e| format!("{}.java", e.type_name),
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
