//! Output formatting for CLI

use crate::config::MappingConfig;
use crate::models::{EffectiveSchema, Origin, RecordType};
use crate::sync::SyncReport;
use crate::validation::ValidationReport;

/// Format the record types known to the catalog, one per line, under
/// their qualified names
pub fn format_record_list(records: &[&RecordType], mapping: &MappingConfig) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&format!(
            "{} ({})",
            mapping.qualify(&record.name),
            record.table_name()
        ));
        if !record.uses.is_empty() {
            output.push_str(&format!(" uses {}", record.uses.join(", ")));
        }
        output.push('\n');
    }
    output.push_str(&format!("\n{} record type(s)\n", records.len()));
    output
}

/// Format an effective schema as a member table
pub fn format_schema(schema: &EffectiveSchema) -> String {
    let mut output = format!("{} (table: {})\n", schema.record_type, schema.table);

    output.push_str("\nAttributes:\n");
    for attr in &schema.attributes {
        let mut flags = Vec::new();
        if attr.primary_key {
            flags.push("primary key");
        }
        if attr.generated {
            flags.push("generated");
        }
        if attr.nullable {
            flags.push("nullable");
        }
        if attr.unique {
            flags.push("unique");
        }
        output.push_str(&format!(
            "  {:<20} {:<16} {:<28} {}\n",
            attr.name,
            attr.sql_type("standard"),
            flags.join(", "),
            origin_label(schema.origin(&attr.name))
        ));
    }

    if !schema.relations.is_empty() {
        output.push_str("\nRelations:\n");
        for rel in &schema.relations {
            output.push_str(&format!(
                "  {:<20} {:<16} {:<28} {}\n",
                rel.name,
                rel.cardinality.as_str(),
                format!("-> {}", rel.target),
                origin_label(schema.origin(&rel.name))
            ));
        }
    }

    output
}

fn origin_label(origin: Option<&Origin>) -> String {
    match origin {
        Some(Origin::Unit(unit)) => format!("from {}", unit),
        Some(Origin::Local) | None => "local".to_string(),
    }
}

/// Format a validation report
pub fn format_report(report: &ValidationReport) -> String {
    let mut output = String::new();

    if !report.errors.is_empty() {
        output.push_str("\n❌ Errors:\n");
        for error in &report.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    if !report.warnings.is_empty() {
        output.push_str("\n⚠️  Warnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    if report.is_valid() {
        output.push_str("\n✅ All checks passed!\n");
    }

    output
}

/// Format pending statements of a dry run
pub fn format_pending(statements: &[String]) -> String {
    if statements.is_empty() {
        return "Nothing to update, storage is in sync.\n".to_string();
    }
    let mut output = statements.join("\n\n");
    output.push_str(&format!("\n\n{} statement(s) pending\n", statements.len()));
    output
}

/// Format the outcome of an apply
pub fn format_sync_report(report: &SyncReport) -> String {
    if !report.applied {
        return format!("Nothing to update ({}).\n", report.output);
    }
    format!(
        "✅ Applied {} statement(s) ({})\n   fingerprint {}\n",
        report.statements.len(),
        report.output.trim(),
        report.fingerprint
    )
}
