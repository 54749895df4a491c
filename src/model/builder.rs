//! Entity list assembly: classify every entity table, then apply the include filter.

use crate::error::IntrospectionError;
use crate::model::{EntityDescriptor, ReverseEngineeringStrategy};
use crate::schema::SchemaGraph;
use std::collections::HashMap;

/// Classify tables in graph order and keep the entities whose type name is in `include` (all when `None`).
///
/// Join tables are skipped when many-to-many detection is on. Associations pointing at
/// excluded entities are kept. Two kept tables that map to the same type name (the same
/// table in two schemas) fail the build, since both would render to one source file.
pub fn build(
    graph: &SchemaGraph,
    strategy: &ReverseEngineeringStrategy,
    include: Option<&[String]>,
) -> Result<Vec<EntityDescriptor>, IntrospectionError> {
    let mut entities: Vec<EntityDescriptor> = graph
        .tables()
        .iter()
        .filter(|t| {
            let skip = strategy.is_many_to_many_table(t);
            if skip {
                tracing::debug!(table = %t.name, "join table mapped as many-to-many");
            }
            !skip
        })
        .map(|t| strategy.classify(t, graph))
        .collect();

    if let Some(include) = include {
        for name in include {
            if !entities.iter().any(|e| &e.type_name == name) {
                tracing::warn!(type_name = %name, "includeTables names no generated entity");
            }
        }
        entities.retain(|e| include.iter().any(|name| name == &e.type_name));
    }

    let mut seen: HashMap<&str, &EntityDescriptor> = HashMap::new();
    for entity in &entities {
        if let Some(first) = seen.insert(entity.type_name.as_str(), entity) {
            return Err(IntrospectionError::ConflictingTypeName {
                type_name: entity.type_name.clone(),
                first: first.table.to_string(),
                second: entity.table.to_string(),
            });
        }
    }

    tracing::info!(entities = entities.len(), tables = graph.len(), "entity model built");
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyFlags;
    use crate::schema::fixtures::*;

    fn school() -> SchemaGraph {
        SchemaGraph::new(vec![
            table("student", vec![column("id", "int4", false)], &["id"], vec![]),
            table("course", vec![column("id", "int4", false)], &["id"], vec![]),
            table(
                "enrollment",
                vec![column("student_id", "int4", false), column("course_id", "int4", false)],
                &["student_id", "course_id"],
                vec![
                    fk("fk_enr_student", "student", &[("student_id", "id")]),
                    fk("fk_enr_course", "course", &[("course_id", "id")]),
                ],
            ),
        ])
        .unwrap()
    }

    fn names(entities: &[EntityDescriptor]) -> Vec<&str> {
        entities.iter().map(|e| e.type_name.as_str()).collect()
    }

    #[test]
    fn keeps_graph_order() {
        let graph = SchemaGraph::new(master_child()).unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");
        let entities = build(&graph, &strategy, None).unwrap();
        assert_eq!(names(&entities), vec!["TabMaster", "TabChild"]);
        assert_eq!(entities, build(&graph, &strategy, None).unwrap());
    }

    #[test]
    fn include_filter_applies_after_classification() {
        let graph = SchemaGraph::new(master_child()).unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");
        let include = vec!["TabMaster".to_string()];
        let entities = build(&graph, &strategy, Some(&include)).unwrap();
        assert_eq!(names(&entities), vec!["TabMaster"]);
        // TabChild is excluded but the collection pointing at it stays.
        assert_eq!(entities[0].associations[0].target_type, "TabChild");
    }

    #[test]
    fn unknown_include_name_yields_nothing() {
        let graph = SchemaGraph::new(master_child()).unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");
        let include = vec!["tab_master".to_string()];
        assert!(build(&graph, &strategy, Some(&include)).unwrap().is_empty());
    }

    #[test]
    fn join_tables_are_not_entities_with_many_to_many() {
        let graph = school();
        let on = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");
        assert_eq!(names(&build(&graph, &on, None).unwrap()), vec!["Student", "Course"]);

        let off = ReverseEngineeringStrategy::new(
            StrategyFlags {
                many_to_many: false,
                ..StrategyFlags::default()
            },
            "",
        );
        assert_eq!(names(&build(&graph, &off, None).unwrap()), vec!["Student", "Course", "Enrollment"]);
    }

    #[test]
    fn same_table_in_two_schemas_is_rejected() {
        let mut archived = table("tab_master", vec![column("id", "int4", false)], &["id"], vec![]);
        archived.name.schema = Some("archive".into());
        let mut tables = master_child();
        tables.push(archived);
        let graph = SchemaGraph::new(tables).unwrap();
        let strategy = ReverseEngineeringStrategy::new(StrategyFlags::default(), "");

        match build(&graph, &strategy, None) {
            Err(IntrospectionError::ConflictingTypeName { type_name, first, second }) => {
                assert_eq!(type_name, "TabMaster");
                assert_eq!(first, "public.tab_master");
                assert_eq!(second, "archive.tab_master");
            }
            other => panic!("unexpected {:?}", other),
        }

        // Filtering to the other entity leaves nothing in conflict.
        let include = vec!["TabChild".to_string()];
        assert_eq!(names(&build(&graph, &strategy, Some(&include)).unwrap()), vec!["TabChild"]);
    }
}
