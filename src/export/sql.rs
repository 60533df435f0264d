//! SQL exporter for generating desired-state DDL from effective schemas.
//!
//! Tables are created in join-column dependency order, and every foreign
//! key is added afterwards with `ALTER TABLE`, so cyclic references between
//! record types still export.
//!
//! # Security
//!
//! All identifiers are quoted and escaped per dialect; string literals in
//! defaults and comments have their quotes doubled. Referential actions are
//! rendered from [`ReferentialAction`], never from free text.

use crate::export::{ExportError, ExportResult};
use crate::models::{Attribute, Cardinality, EffectiveSchema, ReferentialAction, Relation};
use crate::validation::RelationshipValidator;
use crate::validation::input::{sanitize_description, sanitize_sql_identifier};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Exporter for SQL CREATE TABLE format.
pub struct SQLExporter;

/// Foreign key collected while rendering tables
struct ForeignKey {
    table: String,
    column: String,
    target_table: String,
    target_column: String,
    on_delete: Option<ReferentialAction>,
}

impl SQLExporter {
    /// Export effective schemas to DDL (SDK interface).
    ///
    /// # Example
    ///
    /// ```rust
    /// use schema_compose::compose::Composer;
    /// use schema_compose::export::sql::SQLExporter;
    /// use schema_compose::models::{Attribute, RecordType, StorageType};
    /// use schema_compose::registry::Catalog;
    ///
    /// let mut catalog = Catalog::new();
    /// catalog
    ///     .register(
    ///         RecordType::new("Tag")
    ///             .with_attribute(Attribute::new("id", StorageType::Integer).primary())
    ///             .with_attribute(Attribute::new("label", StorageType::String).with_length(40)),
    ///     )
    ///     .unwrap();
    /// let schemas = Composer::new(&catalog).compose_all().unwrap();
    ///
    /// let result = SQLExporter.export(&schemas, Some("postgres")).unwrap();
    /// assert_eq!(result.format, "sql");
    /// assert!(result.content.contains("\"label\" VARCHAR(40) NOT NULL"));
    /// ```
    pub fn export(
        &self,
        schemas: &[EffectiveSchema],
        dialect: Option<&str>,
    ) -> Result<ExportResult, ExportError> {
        let statements = Self::statements(schemas, dialect)?;
        let mut sql = statements.join("\n\n");
        sql.push('\n');
        Ok(ExportResult {
            content: sql,
            format: "sql".to_string(),
        })
    }

    /// Render the DDL statements for a set of effective schemas.
    ///
    /// Every relation target must be part of `schemas`.
    pub fn statements(
        schemas: &[EffectiveSchema],
        dialect: Option<&str>,
    ) -> Result<Vec<String>, ExportError> {
        let dialect = dialect.unwrap_or("standard");
        let validator = RelationshipValidator::new();
        validator.ensure_resolved(schemas)?;

        let by_name: HashMap<&str, &EffectiveSchema> = schemas
            .iter()
            .map(|s| (s.record_type.as_str(), s))
            .collect();

        let mut statements = Vec::new();
        let mut foreign_keys = Vec::new();
        let mut tables: HashSet<String> = schemas.iter().map(|s| s.table.clone()).collect();

        for schema in validator.dependency_order(schemas) {
            let (create, comments) =
                Self::export_table(schema, &by_name, dialect, &mut foreign_keys)?;
            statements.push(create);
            statements.extend(comments);
        }

        for schema in schemas {
            for rel in &schema.relations {
                let Some(join_table) = rel.join_table_name(&schema.table) else {
                    continue;
                };
                if !tables.insert(join_table.clone()) {
                    return Err(ExportError::TableCollision {
                        table: join_table,
                        record: schema.record_type.clone(),
                        relation: rel.name.clone(),
                    });
                }
                let target = by_name[rel.target.as_str()];
                statements.push(Self::export_join_table(
                    schema,
                    rel,
                    target,
                    join_table,
                    dialect,
                    &mut foreign_keys,
                )?);
            }
        }

        for fk in &foreign_keys {
            statements.push(Self::export_foreign_key(fk, dialect));
        }

        debug!(
            "Rendered {} DDL statement(s) for {} record type(s)",
            statements.len(),
            schemas.len()
        );
        Ok(statements)
    }

    /// Render the CREATE TABLE statement of one schema, plus any column
    /// comment statements the dialect needs.
    fn export_table(
        schema: &EffectiveSchema,
        by_name: &HashMap<&str, &EffectiveSchema>,
        dialect: &str,
        foreign_keys: &mut Vec<ForeignKey>,
    ) -> Result<(String, Vec<String>), ExportError> {
        let table = Self::quote_identifier(&schema.table, dialect);
        let mut column_defs = Vec::new();
        let mut columns = HashSet::new();
        let mut comments = Vec::new();

        for attr in &schema.attributes {
            columns.insert(attr.name.clone());
            let mut col_def = format!("  {}", Self::column_definition(attr, dialect));

            if !attr.description.is_empty() {
                let desc = sanitize_description(&attr.description).replace('\'', "''");
                match dialect {
                    "postgres" | "postgresql" => comments.push(format!(
                        "COMMENT ON COLUMN {}.{} IS '{}';",
                        table,
                        Self::quote_identifier(&attr.name, dialect),
                        desc
                    )),
                    "mysql" => col_def.push_str(&format!(" COMMENT '{}'", desc)),
                    _ => {}
                }
            }
            column_defs.push(col_def);
        }

        for rel in &schema.relations {
            let Some(column) = rel.join_column_name() else {
                continue;
            };
            if !columns.insert(column.clone()) {
                return Err(ExportError::ColumnCollision {
                    table: schema.table.clone(),
                    column,
                });
            }

            let target = by_name[rel.target.as_str()];
            let target_pk = Self::single_primary_key(schema, rel, target)?;
            let mut col_def = format!(
                "  {} {}",
                Self::quote_identifier(&column, dialect),
                target_pk.sql_type(dialect)
            );
            if !rel.nullable {
                col_def.push_str(" NOT NULL");
            }
            if rel.cardinality == Cardinality::OneToOne {
                col_def.push_str(" UNIQUE");
            }
            column_defs.push(col_def);

            foreign_keys.push(ForeignKey {
                table: schema.table.clone(),
                column,
                target_table: target.table.clone(),
                target_column: target_pk.name.clone(),
                on_delete: rel.on_delete,
            });
        }

        let primary_key: Vec<String> = schema
            .primary_key()
            .iter()
            .map(|a| Self::quote_identifier(&a.name, dialect))
            .collect();
        if !primary_key.is_empty() {
            column_defs.push(format!("  PRIMARY KEY ({})", primary_key.join(", ")));
        }

        let sql = format!(
            "CREATE TABLE {} (\n{}\n);",
            table,
            column_defs.join(",\n")
        );
        Ok((sql, comments))
    }

    fn export_join_table(
        owner: &EffectiveSchema,
        rel: &Relation,
        target: &EffectiveSchema,
        join_table: String,
        dialect: &str,
        foreign_keys: &mut Vec<ForeignKey>,
    ) -> Result<String, ExportError> {
        let owner_pk = Self::own_primary_key(owner, rel)?;
        let target_pk = Self::single_primary_key(owner, rel, target)?;

        let (owner_column, target_column) = if owner.table == target.table {
            (format!("{}_source", owner.table), format!("{}_target", target.table))
        } else {
            (format!("{}_id", owner.table), format!("{}_id", target.table))
        };

        let quoted_owner = Self::quote_identifier(&owner_column, dialect);
        let quoted_target = Self::quote_identifier(&target_column, dialect);
        let sql = format!(
            "CREATE TABLE {} (\n  {} {} NOT NULL,\n  {} {} NOT NULL,\n  PRIMARY KEY ({}, {})\n);",
            Self::quote_identifier(&join_table, dialect),
            quoted_owner,
            owner_pk.sql_type(dialect),
            quoted_target,
            target_pk.sql_type(dialect),
            quoted_owner,
            quoted_target
        );

        foreign_keys.push(ForeignKey {
            table: join_table.clone(),
            column: owner_column,
            target_table: owner.table.clone(),
            target_column: owner_pk.name.clone(),
            on_delete: Some(ReferentialAction::Cascade),
        });
        foreign_keys.push(ForeignKey {
            table: join_table,
            column: target_column,
            target_table: target.table.clone(),
            target_column: target_pk.name.clone(),
            on_delete: Some(ReferentialAction::Cascade),
        });
        Ok(sql)
    }

    fn export_foreign_key(fk: &ForeignKey, dialect: &str) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            Self::quote_identifier(&fk.table, dialect),
            Self::quote_identifier(&format!("fk_{}_{}", fk.table, fk.column), dialect),
            Self::quote_identifier(&fk.column, dialect),
            Self::quote_identifier(&fk.target_table, dialect),
            Self::quote_identifier(&fk.target_column, dialect)
        );
        if let Some(action) = fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.as_sql()));
        }
        sql.push(';');
        sql
    }

    fn column_definition(attr: &Attribute, dialect: &str) -> String {
        let mut col_def = format!(
            "{} {}",
            Self::quote_identifier(&attr.name, dialect),
            attr.sql_type(dialect)
        );

        if attr.generated {
            match dialect {
                "mysql" => col_def.push_str(" AUTO_INCREMENT"),
                "sqlserver" | "mssql" => col_def.push_str(" IDENTITY(1,1)"),
                _ => col_def.push_str(" GENERATED BY DEFAULT AS IDENTITY"),
            }
        }

        if !attr.nullable {
            col_def.push_str(" NOT NULL");
        }

        if let Some(default) = &attr.default {
            col_def.push_str(&format!(" DEFAULT {}", Self::literal(default, dialect)));
        }

        if attr.unique && !attr.primary_key {
            col_def.push_str(" UNIQUE");
        }

        col_def
    }

    /// Render a default value as a SQL literal
    fn literal(value: &serde_json::Value, dialect: &str) -> String {
        match value {
            serde_json::Value::Null => "NULL".to_string(),
            serde_json::Value::Bool(b) => match dialect {
                "mysql" | "sqlserver" | "mssql" => if *b { "1" } else { "0" }.to_string(),
                _ => if *b { "TRUE" } else { "FALSE" }.to_string(),
            },
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => format!("'{}'", other.to_string().replace('\'', "''")),
        }
    }

    /// Primary key column a join column references
    fn single_primary_key<'s>(
        owner: &EffectiveSchema,
        rel: &Relation,
        target: &'s EffectiveSchema,
    ) -> Result<&'s Attribute, ExportError> {
        match target.primary_key().as_slice() {
            [pk] => Ok(*pk),
            [] => Err(ExportError::UnsupportedReference {
                record: owner.record_type.clone(),
                relation: rel.name.clone(),
                reason: format!("target '{}' has no primary key", target.record_type),
            }),
            _ => Err(ExportError::UnsupportedReference {
                record: owner.record_type.clone(),
                relation: rel.name.clone(),
                reason: format!("target '{}' has a composite primary key", target.record_type),
            }),
        }
    }

    /// Primary key column the owning side of a join table references
    fn own_primary_key<'s>(
        owner: &'s EffectiveSchema,
        rel: &Relation,
    ) -> Result<&'s Attribute, ExportError> {
        match owner.primary_key().as_slice() {
            [pk] => Ok(*pk),
            _ => Err(ExportError::UnsupportedReference {
                record: owner.record_type.clone(),
                relation: rel.name.clone(),
                reason: "a join table needs a single-column primary key on the owning side"
                    .to_string(),
            }),
        }
    }

    /// Quote and escape identifier based on SQL dialect.
    ///
    /// - **PostgreSQL**: Uses double quotes (`"identifier"`)
    /// - **MySQL**: Uses backticks (`` `identifier` ``)
    /// - **SQL Server**: Uses brackets (`[identifier]`)
    /// - **Standard SQL**: Uses double quotes
    fn quote_identifier(identifier: &str, dialect: &str) -> String {
        sanitize_sql_identifier(identifier, dialect)
    }
}
