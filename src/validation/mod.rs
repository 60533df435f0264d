//! Validation functionality
//!
//! Provides validation logic for:
//! - Identifier input (record, unit, member and table names)
//! - Field-set units (inclusion cycles, unknown includes)
//! - Relationships (unresolved targets, inverse sides)
//! - Generated SQL

pub mod input;
pub mod relationships;
pub mod schema;
pub mod units;

pub use relationships::{
    RelationshipValidationError, RelationshipValidationResult, RelationshipValidator,
};
pub use units::{UnitValidationResult, UnitValidator};

use crate::compose::{Composer, ConflictPolicy};
use crate::registry::Catalog;
use input::is_sql_reserved_word;
use serde::Serialize;

/// Aggregated findings for a whole catalog
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every unit and record type of a catalog.
///
/// Unlike [`crate::sync::prepare`], this does not stop at the first
/// failure: every record type is composed and every problem reported.
pub fn validate_catalog(catalog: &Catalog, policy: ConflictPolicy) -> ValidationReport {
    let mut report = ValidationReport::default();

    let units = UnitValidator::new().validate(catalog);
    for (unit, include) in &units.unknown_includes {
        report
            .errors
            .push(format!("Field-set unit '{}' includes unknown unit '{}'", unit, include));
    }
    for cycle in &units.inclusion_cycles {
        report
            .errors
            .push(format!("Circular inclusion between units: {}", cycle.join(", ")));
    }
    for unit in &units.unused_units {
        report
            .warnings
            .push(format!("Field-set unit '{}' is not incorporated by any record type", unit));
    }

    let composer = Composer::new(catalog).with_policy(policy);
    let mut schemas = Vec::new();
    for record in catalog.list_record_types() {
        match composer.compose_record(record) {
            Ok(schema) => schemas.push(schema),
            Err(e) => report.errors.push(e.to_string()),
        }
    }

    for schema in &schemas {
        if schema.primary_key().is_empty() {
            report.warnings.push(format!(
                "Record type '{}' has no primary key attribute",
                schema.record_type
            ));
        }
        if is_sql_reserved_word(&schema.table) {
            report.warnings.push(format!(
                "Table name '{}' of record type '{}' is a reserved SQL word",
                schema.table, schema.record_type
            ));
        }
        for attr in &schema.attributes {
            if is_sql_reserved_word(&attr.name) {
                report.warnings.push(format!(
                    "Attribute '{}' of record type '{}' is a reserved SQL word",
                    attr.name, schema.record_type
                ));
            }
            if attr.length.is_some() && !attr.storage_type.takes_length() {
                report.warnings.push(format!(
                    "Attribute '{}' of record type '{}' sets a length on a {} attribute",
                    attr.name, schema.record_type, attr.storage_type
                ));
            }
        }
    }

    let validator = RelationshipValidator::new();
    let relationships = validator.validate(&schemas);
    for err in relationships.unresolved.iter().chain(&relationships.missing_mapped_by) {
        report.errors.push(err.to_string());
    }
    for missing in &relationships.missing_inverse {
        report.warnings.push(format!(
            "Relation '{}' of record type '{}' names inverse '{}' which '{}' does not declare",
            missing.relation, missing.record, missing.inverse, missing.target
        ));
    }
    for cycle in validator.find_cycles(&schemas) {
        report.warnings.push(format!(
            "Record types reference each other in a cycle: {}",
            cycle.join(", ")
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, FieldSet, RecordType, Relation};

    #[test]
    fn test_report_collects_all_problems() {
        let mut catalog = Catalog::new();
        catalog
            .define(FieldSet::new(
                "PostTrait",
                vec![Attribute::id("id")],
                vec![Relation::many_to_one("user", "User")],
            ))
            .unwrap();
        catalog.register(RecordType::new("Post").uses("PostTrait")).unwrap();
        catalog.register(RecordType::new("Tag").uses("Missing")).unwrap();

        let report = validate_catalog(&catalog, ConflictPolicy::LastWins);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.iter().any(|e| e.contains("unknown field-set unit 'Missing'")));
        assert!(report.errors.iter().any(|e| e.contains("unknown record type 'User'")));
    }
}
