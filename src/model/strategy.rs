//! Reverse-engineering heuristics: naming, association detection, optimistic-lock detection.

use crate::config::{GenerationRequest, SettingKey, StrategyFlags};
use crate::error::ConfigError;
use crate::model::{Association, AssociationKind, EntityDescriptor, Field, JoinTable};
use crate::naming::{columns_suffix, decapitalize, escape_keyword, pluralize, property_name, to_upper_camel_case};
use crate::schema::{Column, ForeignKey, QualifiedName, SchemaGraph, Table};
use crate::typemap;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Column names (case-insensitive) treated as optimistic-lock markers unless a pattern is configured.
pub const DEFAULT_VERSION_COLUMNS: &[&str] = &["version", "lock_version", "row_version", "timestamp"];

#[derive(Clone, Debug)]
pub struct ReverseEngineeringStrategy {
    flags: StrategyFlags,
    package: String,
    /// Overrides `DEFAULT_VERSION_COLUMNS`.
    version_pattern: Option<Regex>,
}

/// Generated type name for a table: `tab_master` -> `TabMaster`.
pub fn type_name(table: &QualifiedName) -> String {
    to_upper_camel_case(&table.name)
}

/// Exactly two foreign keys on disjoint columns that together form a composite primary key and
/// are the only columns.
pub fn is_join_table(table: &Table) -> bool {
    let [first, second] = table.foreign_keys.as_slice() else {
        return false;
    };
    if table.primary_key.len() < 2 {
        return false;
    }
    let near: BTreeSet<&str> = first.local_columns().into_iter().collect();
    let far: BTreeSet<&str> = second.local_columns().into_iter().collect();
    if !near.is_disjoint(&far) {
        return false;
    }
    let fk_columns: BTreeSet<&str> = near.union(&far).copied().collect();
    column_set(&table.primary_key) == fk_columns && table.columns.iter().all(|c| fk_columns.contains(c.name.as_str()))
}

fn column_set(cols: &[String]) -> BTreeSet<&str> {
    cols.iter().map(String::as_str).collect()
}

/// Local columns equal the primary key or a unique key.
fn is_one_to_one_key(table: &Table, fk: &ForeignKey) -> bool {
    let local: BTreeSet<&str> = fk.local_columns().into_iter().collect();
    (!table.primary_key.is_empty() && column_set(&table.primary_key) == local)
        || table.unique_keys.iter().any(|u| column_set(u) == local)
}

fn has_field_named(table: &Table, name: &str) -> bool {
    table.columns.iter().any(|c| property_name(&c.name) == name)
}

fn strings(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

/// Property for the owning to-one side: `tabMaster`, or `tabMasterByMasterref` when ambiguous.
fn to_one_property(owner: &Table, fk: &ForeignKey) -> String {
    let raw = decapitalize(&type_name(&fk.referenced));
    let base = escape_keyword(&raw);
    let same_target = owner
        .foreign_keys
        .iter()
        .filter(|k| k.referenced == fk.referenced)
        .count();
    if same_target > 1 || has_field_named(owner, &base) {
        format!("{}By{}", raw, columns_suffix(&fk.local_columns()))
    } else {
        base
    }
}

/// Property on the referenced side: `tabChilds` / `tabChild`, or `...ForMasterref` when ambiguous.
fn inverse_property(source: &Table, fk: &ForeignKey, target: &Table, collection: bool) -> String {
    let singular = decapitalize(&type_name(&source.name));
    let raw = if collection { pluralize(&singular) } else { singular };
    let base = escape_keyword(&raw);
    let same_target = source
        .foreign_keys
        .iter()
        .filter(|k| k.referenced == fk.referenced)
        .count();
    if same_target > 1 || has_field_named(target, &base) {
        format!("{}For{}", raw, columns_suffix(&fk.local_columns()))
    } else {
        base
    }
}

/// Property on `endpoint` for the join table `join`, where `near` references the endpoint and `far` the other side.
fn many_to_many_property(
    graph: &SchemaGraph,
    endpoint: &Table,
    join: &Table,
    near: &ForeignKey,
    far: &ForeignKey,
) -> String {
    let raw = pluralize(&decapitalize(&type_name(&far.referenced)));
    let base = escape_keyword(&raw);
    let parallel_joins = graph
        .referencing(&endpoint.name)
        .filter(|(j, k)| {
            is_join_table(j)
                && j.foreign_keys
                    .iter()
                    .any(|other| !std::ptr::eq(other, *k) && other.referenced == far.referenced)
        })
        .count();
    let ambiguous = near.referenced == far.referenced || parallel_joins > 1 || has_field_named(endpoint, &base);
    if ambiguous {
        tracing::trace!(join = %join.name, property = %base, "many-to-many property disambiguated");
        format!("{}For{}", raw, columns_suffix(&far.local_columns()))
    } else {
        base
    }
}

impl ReverseEngineeringStrategy {
    pub fn new(flags: StrategyFlags, package: impl Into<String>) -> Self {
        ReverseEngineeringStrategy {
            flags,
            package: package.into(),
            version_pattern: None,
        }
    }

    /// Strategy configured from a resolved request.
    pub fn from_request(request: &GenerationRequest) -> Result<Self, ConfigError> {
        let strategy = ReverseEngineeringStrategy::new(request.flags, request.package.clone());
        match &request.version_pattern {
            Some(pattern) => strategy.with_version_pattern(pattern),
            None => Ok(strategy),
        }
    }

    /// Replace the optimistic-lock column name pattern.
    pub fn with_version_pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            key: SettingKey::VersionColumnPattern.name().to_string(),
            message: e.to_string(),
        })?;
        self.version_pattern = Some(regex);
        Ok(self)
    }

    fn is_version_column(&self, column: &str) -> bool {
        match &self.version_pattern {
            Some(pattern) => pattern.is_match(column),
            None => DEFAULT_VERSION_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(column)),
        }
    }

    /// Join tables become many-to-many associations instead of entities when enabled.
    pub fn is_many_to_many_table(&self, table: &Table) -> bool {
        self.flags.many_to_many && is_join_table(table)
    }

    fn field(&self, table: &Table, column: &Column) -> Field {
        let primary_key = table.is_primary_key_column(&column.name);
        Field {
            name: property_name(&column.name),
            column: column.name.clone(),
            sql_type: column.sql_type.clone(),
            java_type: typemap::java_type(&column.sql_type, column.size, column.nullable || primary_key),
            nullable: column.nullable,
            primary_key,
            version: false,
            default: column.default.clone(),
        }
    }

    /// Derive the entity for `table`. Pure: same inputs, same descriptor.
    pub fn classify(&self, table: &Table, graph: &SchemaGraph) -> EntityDescriptor {
        let mut fields: Vec<Field> = table.columns.iter().map(|c| self.field(table, c)).collect();
        let mut associations = Vec::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for fk in &table.foreign_keys {
            let kind = if self.flags.one_to_one && is_one_to_one_key(table, fk) {
                AssociationKind::OneToOne
            } else if self.flags.many_to_one {
                AssociationKind::ManyToOne
            } else {
                continue;
            };
            let local = fk.local_columns();
            let read_only = local
                .iter()
                .any(|c| table.is_primary_key_column(c) || claimed.contains(c));
            claimed.extend(local.iter().copied());
            associations.push(Association {
                kind,
                property: to_one_property(table, fk),
                target_type: type_name(&fk.referenced),
                target_table: fk.referenced.clone(),
                columns: strings(&local),
                referenced_columns: strings(&fk.referenced_columns()),
                inverse: false,
                mapped_by: None,
                join_table: None,
                read_only,
            });
        }
        fields.retain(|f| f.primary_key || !claimed.contains(f.column.as_str()));

        for (source, fk) in graph.referencing(&table.name) {
            if self.is_many_to_many_table(source) {
                if let Some(assoc) = self.many_to_many(graph, table, source, fk) {
                    associations.push(assoc);
                }
                continue;
            }
            let local = fk.local_columns();
            if self.flags.one_to_one && is_one_to_one_key(source, fk) {
                associations.push(Association {
                    kind: AssociationKind::OneToOne,
                    property: inverse_property(source, fk, table, false),
                    target_type: type_name(&source.name),
                    target_table: source.name.clone(),
                    columns: strings(&local),
                    referenced_columns: strings(&fk.referenced_columns()),
                    inverse: true,
                    mapped_by: Some(to_one_property(source, fk)),
                    join_table: None,
                    read_only: false,
                });
            } else if self.flags.one_to_many {
                associations.push(Association {
                    kind: AssociationKind::OneToMany,
                    property: inverse_property(source, fk, table, true),
                    target_type: type_name(&source.name),
                    target_table: source.name.clone(),
                    columns: strings(&local),
                    referenced_columns: strings(&fk.referenced_columns()),
                    inverse: true,
                    mapped_by: self.flags.many_to_one.then(|| to_one_property(source, fk)),
                    join_table: None,
                    read_only: false,
                });
            }
        }

        let mut version_field = None;
        if self.flags.optimistic_lock {
            if let Some(field) = fields.iter_mut().find(|f| {
                !f.primary_key
                    && self.is_version_column(&f.column)
                    && (typemap::is_integral(&f.sql_type) || typemap::is_timestamp(&f.sql_type))
            }) {
                field.version = true;
                version_field = Some(field.name.clone());
            }
        }

        dedupe_properties(&mut fields, &mut associations);

        EntityDescriptor {
            type_name: type_name(&table.name),
            package: self.package.clone(),
            table: table.name.clone(),
            fields,
            associations,
            version_field,
        }
    }

    fn many_to_many(
        &self,
        graph: &SchemaGraph,
        endpoint: &Table,
        join: &Table,
        near: &ForeignKey,
    ) -> Option<Association> {
        let index = join.foreign_keys.iter().position(|k| std::ptr::eq(k, near))?;
        let far = &join.foreign_keys[1 - index];
        let owning = index == 0;
        let mapped_by = if owning {
            None
        } else {
            let owner = graph.table(&far.referenced)?;
            Some(many_to_many_property(graph, owner, join, far, near))
        };
        Some(Association {
            kind: AssociationKind::ManyToMany,
            property: many_to_many_property(graph, endpoint, join, near, far),
            target_type: type_name(&far.referenced),
            target_table: far.referenced.clone(),
            columns: strings(&near.local_columns()),
            referenced_columns: strings(&near.referenced_columns()),
            inverse: !owning,
            mapped_by,
            join_table: owning.then(|| JoinTable {
                table: join.name.clone(),
                join_columns: strings(&near.local_columns()),
                inverse_join_columns: strings(&far.local_columns()),
            }),
            read_only: false,
        })
    }
}

/// Last-resort numeric suffixes so no two properties of an entity share a name.
fn dedupe_properties(fields: &mut [Field], associations: &mut [Association]) {
    let mut taken: HashSet<String> = HashSet::new();
    let names = fields
        .iter_mut()
        .map(|f| &mut f.name)
        .chain(associations.iter_mut().map(|a| &mut a.property));
    for name in names {
        if taken.insert(name.clone()) {
            continue;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", name, n);
            if taken.insert(candidate.clone()) {
                tracing::warn!(property = %name, renamed = %candidate, "duplicate property name");
                *name = candidate;
                break;
            }
            n += 1;
        }
    }
}
