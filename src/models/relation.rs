//! Relationship model for the SDK

use super::enums::{Cardinality, ReferentialAction};
use serde::{Deserialize, Serialize};

/// Reference from a record type member to another record type
///
/// Relations travel with the field-set unit that declares them, so every
/// record type incorporating the unit also gains the relational edge. The
/// target is resolved by name when schemas are prepared for
/// synchronization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    /// Member name on the declaring record type
    pub name: String,
    /// Target record type name
    pub target: String,
    pub cardinality: Cardinality,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Inverse side: name of the owning relation on the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    /// Owning side: name of the inverse relation on the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,
    /// Explicit join column name (default: `<name>_id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column: Option<String>,
    /// Explicit join table name of an owning many-to-many relation
    /// (default: `<table>_<name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
}

fn default_true() -> bool {
    true
}

impl Relation {
    pub fn new(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality,
            nullable: true,
            mapped_by: None,
            inversed_by: None,
            join_column: None,
            join_table: None,
            on_delete: None,
        }
    }

    pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, Cardinality::ManyToOne)
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn mapped_by(mut self, relation: impl Into<String>) -> Self {
        self.mapped_by = Some(relation.into());
        self
    }

    pub fn inversed_by(mut self, relation: impl Into<String>) -> Self {
        self.inversed_by = Some(relation.into());
        self
    }

    pub fn with_join_column(mut self, column: impl Into<String>) -> Self {
        self.join_column = Some(column.into());
        self
    }

    pub fn with_join_table(mut self, table: impl Into<String>) -> Self {
        self.join_table = Some(table.into());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Whether this side of the relation owns storage (a join column or a
    /// join table)
    pub fn is_owning_side(&self) -> bool {
        match self.cardinality {
            Cardinality::ManyToOne => true,
            Cardinality::OneToOne | Cardinality::ManyToMany => self.mapped_by.is_none(),
            Cardinality::OneToMany => false,
        }
    }

    /// Foreign key column carried by the declaring table, if any
    pub fn join_column_name(&self) -> Option<String> {
        match self.cardinality {
            Cardinality::ManyToOne | Cardinality::OneToOne if self.is_owning_side() => Some(
                self.join_column
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", self.name)),
            ),
            _ => None,
        }
    }

    /// Join table of an owning many-to-many relation declared on `table`
    pub fn join_table_name(&self, table: &str) -> Option<String> {
        match self.cardinality {
            Cardinality::ManyToMany if self.is_owning_side() => Some(
                self.join_table
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}", table, self.name)),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_side() {
        assert!(Relation::many_to_one("user", "User").is_owning_side());
        assert!(!Relation::new("posts", "Post", Cardinality::OneToMany)
            .mapped_by("user")
            .is_owning_side());
        assert!(!Relation::new("profile", "Profile", Cardinality::OneToOne)
            .mapped_by("user")
            .is_owning_side());
    }

    #[test]
    fn test_join_column_name() {
        assert_eq!(
            Relation::many_to_one("user", "User").join_column_name(),
            Some("user_id".to_string())
        );
        assert_eq!(
            Relation::many_to_one("author", "User")
                .with_join_column("written_by")
                .join_column_name(),
            Some("written_by".to_string())
        );
        assert_eq!(
            Relation::new("tags", "Tag", Cardinality::ManyToMany).join_column_name(),
            None
        );
    }

    #[test]
    fn test_join_table_name() {
        let tags = Relation::new("tags", "Tag", Cardinality::ManyToMany);
        assert_eq!(tags.join_table_name("post"), Some("post_tags".to_string()));
        assert_eq!(
            tags.with_join_table("post_labels").join_table_name("post"),
            Some("post_labels".to_string())
        );
        assert_eq!(
            Relation::new("posts", "Post", Cardinality::ManyToMany)
                .mapped_by("tags")
                .join_table_name("tag"),
            None
        );
    }
}
