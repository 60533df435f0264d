//! Record type composition
//!
//! Merges incorporated field-set units with a record type's own
//! declarations into an [`EffectiveSchema`]:
//!
//! 1. start from an empty ordered member map
//! 2. merge each incorporated unit in declaration order, later units
//!    overriding earlier ones (a unit's includes are flattened first)
//! 3. merge the record type's local declarations last
//!
//! What happens when two units disagree on a member without a local
//! override is decided by [`ConflictPolicy`].

pub mod merge;

pub use merge::{Conflict, Declared, MemberMap};

use crate::models::{EffectiveSchema, Member, Origin, RecordType};
use crate::registry::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Error during composition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposeError {
    #[error("Record type '{record}' references unknown field-set unit '{unit}'")]
    UnknownUnit { record: String, unit: String },
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),
    #[error(
        "Record type '{record}': units '{first}' and '{second}' define '{attribute}' differently"
    )]
    ConflictingAttribute {
        record: String,
        attribute: String,
        first: String,
        second: String,
    },
    #[error("Circular inclusion of field-set units: {}", .cycle.join(" -> "))]
    CircularInclusion { cycle: Vec<String> },
}

/// Resolution policy for members defined differently by two incorporated
/// units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The unit incorporated last wins
    #[default]
    LastWins,
    /// Fail with [`ComposeError::ConflictingAttribute`]
    FailFast,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::LastWins => f.write_str("last_wins"),
            ConflictPolicy::FailFast => f.write_str("fail_fast"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "last_wins" => Ok(ConflictPolicy::LastWins),
            "fail_fast" => Ok(ConflictPolicy::FailFast),
            other => Err(format!("unknown conflict policy: {}", other)),
        }
    }
}

/// Composes record types of a catalog into effective schemas.
///
/// The composer only reads the catalog; every call builds a fresh member
/// map, so composing the same record twice yields identical results.
pub struct Composer<'a> {
    catalog: &'a Catalog,
    policy: ConflictPolicy,
}

impl<'a> Composer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Compose the record type registered under `name`
    pub fn compose(&self, name: &str) -> Result<EffectiveSchema, ComposeError> {
        let record = self
            .catalog
            .record_types
            .get(name)
            .map_err(|_| ComposeError::UnknownRecordType(name.to_string()))?;
        self.compose_record(record)
    }

    /// Compose every registered record type, in registration order
    pub fn compose_all(&self) -> Result<Vec<EffectiveSchema>, ComposeError> {
        let schemas = self
            .catalog
            .list_record_types()
            .into_iter()
            .map(|record| self.compose_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Composed {} record type(s)", schemas.len());
        Ok(schemas)
    }

    /// Compose a record type, which does not have to be registered
    pub fn compose_record(&self, record: &RecordType) -> Result<EffectiveSchema, ComposeError> {
        let mut members = MemberMap::new();
        let mut incorporated = HashSet::new();

        for unit in &record.uses {
            if !incorporated.insert(unit.as_str()) {
                warn!(
                    "Record type {} incorporates unit {} more than once; ignoring repeat",
                    record.name, unit
                );
                continue;
            }
            let flattened = self.flatten(unit, &record.name, &mut Vec::new())?;
            members.absorb(flattened);
        }

        for member in record.local_members() {
            members.override_with(member, Origin::Local);
        }

        if let Some(conflict) = members.conflicts().next() {
            match self.policy {
                ConflictPolicy::FailFast => {
                    return Err(ComposeError::ConflictingAttribute {
                        record: record.name.clone(),
                        attribute: conflict.member.clone(),
                        first: conflict.first.clone(),
                        second: conflict.second.clone(),
                    });
                }
                ConflictPolicy::LastWins => {
                    for conflict in members.conflicts() {
                        debug!(
                            "Record type {}: '{}' from {} overrides {}",
                            record.name, conflict.member, conflict.second, conflict.first
                        );
                    }
                }
            }
        }

        Ok(Self::build(record, members))
    }

    /// Flatten a unit and its includes into an ordered member map.
    ///
    /// The unit's own members override included ones; disagreements between
    /// two included units are kept as conflicts.
    pub fn flatten_unit(&self, unit: &str) -> Result<Vec<Declared>, ComposeError> {
        Ok(self.flatten(unit, unit, &mut Vec::new())?.into_entries())
    }

    fn flatten(
        &self,
        unit: &str,
        record: &str,
        stack: &mut Vec<String>,
    ) -> Result<MemberMap, ComposeError> {
        if let Some(pos) = stack.iter().position(|u| u == unit) {
            let mut cycle = stack[pos..].to_vec();
            cycle.push(unit.to_string());
            return Err(ComposeError::CircularInclusion { cycle });
        }

        let field_set =
            self.catalog
                .field_sets
                .resolve(unit)
                .map_err(|_| ComposeError::UnknownUnit {
                    record: record.to_string(),
                    unit: unit.to_string(),
                })?;

        stack.push(unit.to_string());
        let mut members = MemberMap::new();
        for included in &field_set.includes {
            let inner = self.flatten(included, record, stack)?;
            members.absorb(inner);
        }
        for member in field_set.members() {
            members.override_with(member, Origin::Unit(field_set.name.clone()));
        }
        stack.pop();

        Ok(members)
    }

    fn build(record: &RecordType, members: MemberMap) -> EffectiveSchema {
        let mut attributes = Vec::new();
        let mut relations = Vec::new();
        let mut provenance = BTreeMap::new();

        for declared in members.into_entries() {
            provenance.insert(declared.member.name().to_string(), declared.origin);
            match declared.member {
                Member::Attribute(attr) => attributes.push(attr),
                Member::Relation(rel) => relations.push(rel),
            }
        }

        EffectiveSchema {
            id: record.id(),
            record_type: record.name.clone(),
            table: record.table_name(),
            attributes,
            relations,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, FieldSet, Relation, StorageType};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .define(FieldSet::new(
                "Timestampable",
                vec![
                    Attribute::new("created_at", StorageType::DateTime),
                    Attribute::new("updated_at", StorageType::DateTime).nullable(),
                ],
                vec![],
            ))
            .unwrap();
        catalog
            .define(
                FieldSet::new(
                    "Authored",
                    vec![Attribute::new("updated_at", StorageType::DateTime)],
                    vec![Relation::many_to_one("author", "User")],
                )
                .including("Timestampable"),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_flatten_includes_first() {
        let catalog = catalog();
        let composer = Composer::new(&catalog);
        let flat = composer.flatten_unit("Authored").unwrap();
        let names: Vec<&str> = flat.iter().map(|d| d.member.name()).collect();
        assert_eq!(names, vec!["created_at", "updated_at", "author"]);
        // own declaration overrides the included nullable one
        assert!(!flat[1].member.as_attribute().unwrap().nullable);
        assert_eq!(flat[1].origin, Origin::Unit("Authored".to_string()));
        assert_eq!(flat[0].origin, Origin::Unit("Timestampable".to_string()));
    }

    #[test]
    fn test_circular_inclusion() {
        let mut catalog = Catalog::new();
        catalog
            .define(FieldSet::new("A", vec![], vec![]).including("B"))
            .unwrap();
        catalog
            .define(FieldSet::new("B", vec![], vec![]).including("A"))
            .unwrap();
        catalog.register(RecordType::new("R").uses("A")).unwrap();

        let err = Composer::new(&catalog).compose("R").unwrap_err();
        assert_eq!(
            err,
            ComposeError::CircularInclusion {
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
            }
        );
    }

    #[test]
    fn test_repeated_incorporation_is_ignored() {
        let mut catalog = catalog();
        catalog
            .register(
                RecordType::new("Note")
                    .uses("Timestampable")
                    .uses("Timestampable"),
            )
            .unwrap();
        let schema = Composer::new(&catalog).compose("Note").unwrap();
        assert_eq!(schema.attribute_names(), vec!["created_at", "updated_at"]);
    }

    #[test]
    fn test_conflict_policy_parse() {
        assert_eq!("fail-fast".parse::<ConflictPolicy>(), Ok(ConflictPolicy::FailFast));
        assert_eq!("last_wins".parse::<ConflictPolicy>(), Ok(ConflictPolicy::LastWins));
        assert!("first_wins".parse::<ConflictPolicy>().is_err());
    }
}
