//! Field-set unit registry

use super::{RegistryError, check_declaration};
use crate::models::FieldSet;
use crate::validation::input::validate_identifier;
use std::collections::HashMap;
use tracing::info;

/// Catalog of named field-set units available for incorporation
#[derive(Debug, Clone, Default)]
pub struct FieldSetRegistry {
    units: Vec<FieldSet>,
    index: HashMap<String, usize>,
}

impl FieldSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit.
    ///
    /// Fails with [`RegistryError::DuplicateDefinition`] if a unit of the same
    /// name exists. Included units do not have to be defined yet; they are
    /// resolved at composition time.
    pub fn define(&mut self, unit: FieldSet) -> Result<(), RegistryError> {
        validate_identifier(&unit.name, "unit name")?;
        if self.index.contains_key(&unit.name) {
            return Err(RegistryError::DuplicateDefinition {
                kind: "Field-set unit",
                name: unit.name,
            });
        }
        check_declaration(
            &format!("Field-set unit '{}'", unit.name),
            &unit.members(),
            &unit.includes,
            &unit.description,
        )?;

        info!(
            "Defined field-set unit {} ({} attributes, {} relations)",
            unit.name,
            unit.attributes.len(),
            unit.relations.len()
        );
        self.index.insert(unit.name.clone(), self.units.len());
        self.units.push(unit);
        Ok(())
    }

    /// Return the unit registered under `name`
    pub fn resolve(&self, name: &str) -> Result<&FieldSet, RegistryError> {
        self.index
            .get(name)
            .map(|&idx| &self.units[idx])
            .ok_or_else(|| RegistryError::UnknownUnit(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Unit names in definition order
    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSet> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, StorageType};

    #[test]
    fn test_define_and_resolve() {
        let mut registry = FieldSetRegistry::new();
        registry
            .define(FieldSet::new(
                "Timestampable",
                vec![Attribute::new("created_at", StorageType::DateTime)],
                vec![],
            ))
            .unwrap();

        let unit = registry.resolve("Timestampable").unwrap();
        assert_eq!(unit.attributes[0].name, "created_at");
        assert!(registry.contains("Timestampable"));
        assert_eq!(registry.names(), vec!["Timestampable"]);
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut registry = FieldSetRegistry::new();
        registry.define(FieldSet::new("A", vec![], vec![])).unwrap();
        let err = registry.define(FieldSet::new("A", vec![], vec![])).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDefinition { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_unit() {
        let registry = FieldSetRegistry::new();
        assert_eq!(
            registry.resolve("Missing").unwrap_err(),
            RegistryError::UnknownUnit("Missing".to_string())
        );
    }

    #[test]
    fn test_duplicate_member_within_unit() {
        let mut registry = FieldSetRegistry::new();
        let err = registry
            .define(FieldSet::new(
                "A",
                vec![
                    Attribute::new("x", StorageType::Integer),
                    Attribute::new("x", StorageType::Text),
                ],
                vec![],
            ))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateMember { .. }));
    }
}
