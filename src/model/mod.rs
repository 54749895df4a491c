//! Entity model: descriptors derived from tables, ready for export.

pub mod builder;
pub mod strategy;

pub use builder::build;
pub use strategy::{is_join_table, type_name, ReverseEngineeringStrategy, DEFAULT_VERSION_COLUMNS};

use crate::schema::QualifiedName;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

impl AssociationKind {
    pub fn is_collection(self) -> bool {
        matches!(self, AssociationKind::OneToMany | AssociationKind::ManyToMany)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Property name (lowerCamelCase).
    pub name: String,
    pub column: String,
    pub sql_type: String,
    /// Qualified language type, e.g. `java.util.Date` or `int`.
    pub java_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    /// Optimistic-lock marker.
    pub version: bool,
    pub default: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoinTable {
    pub table: QualifiedName,
    /// Columns of the join table referencing the owning side.
    pub join_columns: Vec<String>,
    /// Columns of the join table referencing the target side.
    pub inverse_join_columns: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Association {
    pub kind: AssociationKind,
    pub property: String,
    pub target_type: String,
    pub target_table: QualifiedName,
    /// Foreign key columns: on this table for owning sides, on the target table for inverse sides.
    pub columns: Vec<String>,
    /// Columns the foreign key points at, paired with `columns`.
    pub referenced_columns: Vec<String>,
    pub inverse: bool,
    /// Property on the owning side, for inverse associations whose owner is generated.
    pub mapped_by: Option<String>,
    pub join_table: Option<JoinTable>,
    /// Join columns are also mapped as fields (primary key) or by another association.
    pub read_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    pub type_name: String,
    pub package: String,
    pub table: QualifiedName,
    pub fields: Vec<Field>,
    pub associations: Vec<Association>,
    pub version_field: Option<String>,
}

impl EntityDescriptor {
    /// `package.TypeName`, or just the type name in the unnamed package.
    pub fn qualified_type_name(&self) -> String {
        if self.package.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.package, self.type_name)
        }
    }

    pub fn id_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    pub fn has_composite_id(&self) -> bool {
        self.id_fields().count() > 1
    }

    pub fn association(&self, property: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.property == property)
    }
}
