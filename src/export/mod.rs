//! Source exporters: render entity descriptors through Tera templates into a package tree.

pub mod dao;
pub mod pojo;
pub mod templates;

pub use dao::DaoExporter;
pub use pojo::PojoExporter;
pub use templates::{TemplateSet, DAO_TEMPLATE, POJO_TEMPLATE};

use crate::config::ExporterSettings;
use crate::error::ExportError;
use crate::model::{Association, AssociationKind, EntityDescriptor, Field};
use crate::naming::{capitalize, package_path};
use crate::typemap;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;

/// Tool version stamped into every generated header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One artifact kind. Runs once per generation over the whole entity list.
pub trait Exporter {
    /// Short name used in reports and logs (`pojo`, `dao`).
    fn name(&self) -> &'static str;

    /// Render every entity and return the written paths in entity order.
    fn export(
        &self,
        entities: &[EntityDescriptor],
        settings: &ExporterSettings,
    ) -> Result<Vec<PathBuf>, ExportError>;
}

/// Options shared by both exporters.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// JPA annotations and `EntityManager` DAOs when set; plain classes and `SessionFactory` DAOs otherwise.
    pub annotations: bool,
    pub generated_at: DateTime<Local>,
}

impl RenderOptions {
    pub fn new(annotations: bool) -> Self {
        RenderOptions {
            annotations,
            generated_at: Local::now(),
        }
    }
}

#[derive(Serialize)]
struct FieldView {
    name: String,
    column: String,
    java_type: String,
    getter: String,
    setter: String,
    nullable: bool,
    primary_key: bool,
    version: bool,
    default: Option<String>,
}

#[derive(Serialize)]
struct JoinColumnView {
    name: String,
    referenced: String,
}

#[derive(Serialize)]
struct JoinTableView {
    name: String,
    schema: Option<String>,
    catalog: Option<String>,
    join_columns: Vec<String>,
    inverse_join_columns: Vec<String>,
}

#[derive(Serialize)]
struct AssociationView {
    kind: AssociationKind,
    property: String,
    target_type: String,
    /// Declared property type: the target type, or `Set<Target>` for collections.
    java_type: String,
    getter: String,
    setter: String,
    collection: bool,
    inverse: bool,
    mapped_by: Option<String>,
    join_columns: Vec<JoinColumnView>,
    join_table: Option<JoinTableView>,
    read_only: bool,
}

/// Template-facing entity: simple type names, accessor names and imports resolved up front.
#[derive(Serialize)]
pub(crate) struct EntityView {
    package: String,
    type_name: String,
    qualified_type_name: String,
    table_name: String,
    schema: Option<String>,
    catalog: Option<String>,
    imports: Vec<String>,
    fields: Vec<FieldView>,
    id_fields: Vec<FieldView>,
    composite_id: bool,
    /// Identifier type for lookups; `None` when the table has no primary key.
    id_type: Option<String>,
    associations: Vec<AssociationView>,
    version_field: Option<String>,
}

fn simple_type(qualified: &str) -> String {
    typemap::simple_name(qualified).0
}

fn field_view(field: &Field) -> FieldView {
    let java_type = simple_type(&field.java_type);
    let prefix = if java_type == "boolean" { "is" } else { "get" };
    FieldView {
        getter: format!("{}{}", prefix, capitalize(&field.name)),
        setter: format!("set{}", capitalize(&field.name)),
        name: field.name.clone(),
        column: field.column.clone(),
        java_type,
        nullable: field.nullable,
        primary_key: field.primary_key,
        version: field.version,
        default: field.default.clone(),
    }
}

fn association_view(assoc: &Association) -> AssociationView {
    let collection = assoc.kind.is_collection();
    let java_type = if collection {
        format!("Set<{}>", assoc.target_type)
    } else {
        assoc.target_type.clone()
    };
    AssociationView {
        kind: assoc.kind,
        property: assoc.property.clone(),
        target_type: assoc.target_type.clone(),
        java_type,
        getter: format!("get{}", capitalize(&assoc.property)),
        setter: format!("set{}", capitalize(&assoc.property)),
        collection,
        inverse: assoc.inverse,
        mapped_by: assoc.mapped_by.clone(),
        join_columns: assoc
            .columns
            .iter()
            .zip(&assoc.referenced_columns)
            .map(|(name, referenced)| JoinColumnView {
                name: name.clone(),
                referenced: referenced.clone(),
            })
            .collect(),
        join_table: assoc.join_table.as_ref().map(|jt| JoinTableView {
            name: jt.table.name.clone(),
            schema: jt.table.schema.clone(),
            catalog: jt.table.catalog.clone(),
            join_columns: jt.join_columns.clone(),
            inverse_join_columns: jt.inverse_join_columns.clone(),
        }),
        read_only: assoc.read_only,
    }
}

/// Identifier type for lookups: the boxed key type, `Type.Id` for composite keys.
fn id_type(entity: &EntityDescriptor) -> Option<String> {
    let mut ids = entity.id_fields();
    let first = ids.next()?;
    if ids.next().is_some() {
        Some(format!("{}.Id", entity.type_name))
    } else {
        Some(simple_type(&first.java_type))
    }
}

/// Imports needed by the field types of `entity`, excluding `java.lang`.
pub(crate) fn field_type_imports(entity: &EntityDescriptor) -> BTreeSet<String> {
    entity
        .fields
        .iter()
        .filter_map(|f| typemap::simple_name(&f.java_type).1)
        .collect()
}

impl EntityView {
    pub(crate) fn new(entity: &EntityDescriptor, imports: BTreeSet<String>) -> Self {
        let fields: Vec<FieldView> = entity.fields.iter().map(field_view).collect();
        let id_fields: Vec<FieldView> = entity.id_fields().map(field_view).collect();
        EntityView {
            package: entity.package.clone(),
            type_name: entity.type_name.clone(),
            qualified_type_name: entity.qualified_type_name(),
            table_name: entity.table.name.clone(),
            schema: entity.table.schema.clone(),
            catalog: entity.table.catalog.clone(),
            imports: imports.into_iter().collect(),
            composite_id: id_fields.len() > 1,
            id_type: id_type(entity),
            fields,
            id_fields,
            associations: entity.associations.iter().map(association_view).collect(),
            version_field: entity.version_field.clone(),
        }
    }
}

/// Build the Tera context for one entity.
pub(crate) fn render_context(view: &EntityView, options: &RenderOptions) -> Context {
    let mut context = Context::new();
    context.insert("entity", view);
    context.insert("annotations", &options.annotations);
    context.insert("generated_at", &options.generated_at.format("%Y-%m-%d %H:%M:%S").to_string());
    context.insert("version", VERSION);
    context
}

/// Write `contents` to `path`, creating parent directories. Existing files are overwritten.
pub(crate) fn write_source(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExportError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Render `template` once per entity into `<out>/<package path>/<file name>`.
pub(crate) fn export_entities(
    templates: &TemplateSet,
    template: &str,
    entities: &[EntityDescriptor],
    output_dir: &Path,
    file_name: impl Fn(&EntityDescriptor) -> String,
    context: impl Fn(&EntityDescriptor) -> Context,
) -> Result<Vec<PathBuf>, ExportError> {
    let mut written = Vec::with_capacity(entities.len());
    for entity in entities {
        let source = templates
            .render(template, &context(entity))
            .map_err(|source| ExportError::Render {
                template: template.to_string(),
                entity: entity.qualified_type_name(),
                source,
            })?;
        let path = output_dir
            .join(package_path(&entity.package))
            .join(file_name(entity));
        write_source(&path, &source)?;
        tracing::debug!(path = %path.display(), entity = %entity.type_name, "source written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::StrategyFlags;
    use crate::model::{build, EntityDescriptor, ReverseEngineeringStrategy};
    use crate::schema::fixtures::*;
    use crate::schema::SchemaGraph;

    /// Classified master/child entities in package `com.acme`.
    pub fn master_child_entities() -> Vec<EntityDescriptor> {
        let graph = SchemaGraph::new(master_child()).unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "com.acme");
        build(&graph, &strategy, None).unwrap()
    }

    /// Student/course linked through a pure join table, plus a versioned composite-key table.
    pub fn school_entities() -> Vec<EntityDescriptor> {
        let graph = SchemaGraph::new(vec![
            table("student", vec![column("id", "int8", false), column("active", "bool", false)], &["id"], vec![]),
            table("course", vec![column("id", "int8", false)], &["id"], vec![]),
            table(
                "enrollment",
                vec![column("student_id", "int8", false), column("course_id", "int8", false)],
                &["student_id", "course_id"],
                vec![
                    fk("fk_enr_student", "student", &[("student_id", "id")]),
                    fk("fk_enr_course", "course", &[("course_id", "id")]),
                ],
            ),
            table(
                "grade",
                vec![
                    column("student_id", "int8", false),
                    column("term", "varchar", false),
                    column("score", "numeric", true),
                    column("version", "int4", false),
                ],
                &["student_id", "term"],
                vec![fk("fk_grade_student", "student", &[("student_id", "id")])],
            ),
        ])
        .unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");
        build(&graph, &strategy, None).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn view_resolves_accessors_and_id_type() {
        let entities = school_entities();
        let student = EntityView::new(&entities[0], BTreeSet::new());
        assert_eq!(student.id_type.as_deref(), Some("Long"));
        assert_eq!(student.fields[1].getter, "isActive");
        let courses = &student.associations[0];
        assert_eq!(courses.java_type, "Set<Course>");
        assert_eq!(courses.getter, "getCourses");
        assert!(courses.join_table.is_some());

        let grade = EntityView::new(&entities[2], BTreeSet::new());
        assert!(grade.composite_id);
        assert_eq!(grade.id_type.as_deref(), Some("Grade.Id"));
        assert_eq!(grade.version_field.as_deref(), Some("version"));
    }

    #[test]
    fn field_imports_skip_unqualified_types() {
        let entities = school_entities();
        assert!(field_type_imports(&entities[0]).is_empty());
        let grade = field_type_imports(&entities[2]);
        assert_eq!(grade.into_iter().collect::<Vec<_>>(), vec!["java.math.BigDecimal"]);
    }

    #[test]
    fn join_columns_pair_local_and_referenced() {
        let entities = master_child_entities();
        let child = EntityView::new(&entities[1], BTreeSet::new());
        let master = &child.associations[0];
        assert_eq!(master.join_columns.len(), 1);
        assert_eq!(master.join_columns[0].name, "masterref");
        assert_eq!(master.join_columns[0].referenced, "id");
    }

    #[test]
    fn write_source_creates_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("com/acme/A.java");
        write_source(&path, "first").unwrap();
        write_source(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
