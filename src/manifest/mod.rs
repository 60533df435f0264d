//! Manifest loading
//!
//! Definitions are declared in YAML manifests. A manifest lists field-set
//! units, record types, and further manifests to include (paths relative to
//! the including file):
//!
//! ```yaml
//! include:
//!   - units/timestamps.yaml
//! field_sets:
//!   - name: UserTrait
//!     attributes:
//!       - { name: id, type: integer, primary_key: true, generated: true }
//!       - { name: firstname, type: string(50) }
//! record_types:
//!   - name: App\Entity\User
//!     uses: [UserTrait]
//! ```
//!
//! Attribute types accept a shorthand: `string(100)` sets the length,
//! `decimal(10,2)` sets precision and scale.

use crate::config::MappingConfig;
use crate::models::{
    Attribute, Cardinality, FieldSet, RecordType, ReferentialAction, Relation, StorageType,
};
use crate::registry::{Catalog, RegistryError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

static TYPE_SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_]+)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$").unwrap()
});

/// Manifest loading errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Circular manifest include: {}", .chain.join(" -> "))]
    CircularInclude { chain: Vec<String> },
    #[error("Invalid type '{ty}' for attribute '{attribute}' of '{owner}': {reason}")]
    InvalidType {
        owner: String,
        attribute: String,
        ty: String,
        reason: String,
    },
    #[error("Invalid cardinality for relation '{relation}' of '{owner}': {reason}")]
    InvalidCardinality {
        owner: String,
        relation: String,
        reason: String,
    },
    #[error("Invalid on_delete action '{action}' for relation '{relation}' of '{owner}': {reason}")]
    InvalidReferentialAction {
        owner: String,
        relation: String,
        action: String,
        reason: String,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// One manifest file, as written
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Manifest {
    pub include: Vec<String>,
    pub field_sets: Vec<RawFieldSet>,
    pub record_types: Vec<RawRecordType>,
}

impl Manifest {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawFieldSet {
    pub name: String,
    pub includes: Vec<String>,
    pub attributes: Vec<RawAttribute>,
    pub relations: Vec<RawRelation>,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawRecordType {
    pub name: String,
    pub table: Option<String>,
    pub uses: Vec<String>,
    pub attributes: Vec<RawAttribute>,
    pub relations: Vec<RawRelation>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRelation {
    pub name: String,
    pub target: String,
    #[serde(default = "default_cardinality")]
    pub cardinality: String,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub mapped_by: Option<String>,
    #[serde(default)]
    pub inversed_by: Option<String>,
    #[serde(default)]
    pub join_column: Option<String>,
    #[serde(default)]
    pub join_table: Option<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
}

fn default_cardinality() -> String {
    Cardinality::ManyToOne.as_str().to_string()
}

/// Parse a type shorthand into a storage type plus length or precision/scale
pub fn parse_type(ty: &str) -> Result<(StorageType, Option<u32>, Option<(u32, Option<u32>)>), String> {
    let caps = TYPE_SHORTHAND
        .captures(ty)
        .ok_or_else(|| "expected `name`, `name(n)` or `name(p,s)`".to_string())?;
    let storage_type: StorageType = caps[1].parse()?;
    let first = caps.get(2).map(|m| m.as_str().parse::<u32>());
    let second = caps.get(3).map(|m| m.as_str().parse::<u32>());
    let first = first.transpose().map_err(|e| e.to_string())?;
    let second = second.transpose().map_err(|e| e.to_string())?;

    match (storage_type, first, second) {
        (t, None, _) => Ok((t, None, None)),
        (StorageType::Decimal, Some(p), s) => Ok((StorageType::Decimal, None, Some((p, s)))),
        (t, Some(len), None) if t.takes_length() => Ok((t, Some(len), None)),
        (t, Some(_), _) => Err(format!("{} does not take arguments of this form", t)),
    }
}

/// Loads manifests into a [`Catalog`]
pub struct ManifestLoader<'a> {
    mapping: &'a MappingConfig,
}

impl<'a> ManifestLoader<'a> {
    pub fn new(mapping: &'a MappingConfig) -> Self {
        Self { mapping }
    }

    /// Load the root manifest named by the mapping config
    pub fn load_default(&self) -> Result<Catalog, ManifestError> {
        self.load(self.mapping.manifest_path())
    }

    /// Load a manifest and everything it includes.
    ///
    /// Included manifests are loaded before the including one. A manifest
    /// reached twice through different include paths is loaded once.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Catalog, ManifestError> {
        let mut catalog = Catalog::new();
        let mut loaded = HashSet::new();
        let mut stack = Vec::new();
        self.load_file(path.as_ref(), &mut catalog, &mut loaded, &mut stack)?;
        info!(
            "Loaded {} field-set unit(s) and {} record type(s) from {} manifest(s)",
            catalog.field_sets.len(),
            catalog.record_types.len(),
            loaded.len()
        );
        Ok(catalog)
    }

    fn load_file(
        &self,
        path: &Path,
        catalog: &mut Catalog,
        loaded: &mut HashSet<PathBuf>,
        stack: &mut Vec<PathBuf>,
    ) -> Result<(), ManifestError> {
        let canonical = path.canonicalize().map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(pos) = stack.iter().position(|p| p == &canonical) {
            let mut chain: Vec<String> = stack[pos..]
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            chain.push(canonical.display().to_string());
            return Err(ManifestError::CircularInclude { chain });
        }
        if loaded.contains(&canonical) {
            debug!("Manifest {} already loaded", canonical.display());
            return Ok(());
        }

        let content = std::fs::read_to_string(&canonical).map_err(|source| ManifestError::Io {
            path: canonical.clone(),
            source,
        })?;
        let manifest =
            Manifest::from_yaml_str(&content).map_err(|source| ManifestError::Parse {
                path: canonical.clone(),
                source,
            })?;

        stack.push(canonical.clone());
        let base = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        for include in &manifest.include {
            self.load_file(&base.join(include), catalog, loaded, stack)?;
        }
        stack.pop();

        self.apply(manifest, catalog)?;
        loaded.insert(canonical);
        Ok(())
    }

    /// Register the definitions of one parsed manifest
    pub fn apply(&self, manifest: Manifest, catalog: &mut Catalog) -> Result<(), ManifestError> {
        for raw in manifest.field_sets {
            let name = self.mapping.normalize(&raw.name);
            let mut unit = FieldSet::new(
                name.clone(),
                self.attributes(&name, raw.attributes)?,
                self.relations(&name, raw.relations)?,
            )
            .with_description(raw.description);
            for include in &raw.includes {
                unit = unit.including(self.mapping.normalize(include));
            }
            catalog.define(unit)?;
        }

        for raw in manifest.record_types {
            let name = self.mapping.normalize(&raw.name);
            let mut record = RecordType::new(name.clone()).with_description(raw.description);
            if let Some(table) = raw.table {
                record = record.with_table(table);
            }
            for unit in &raw.uses {
                record = record.uses(self.mapping.normalize(unit));
            }
            for attribute in self.attributes(&name, raw.attributes)? {
                record = record.with_attribute(attribute);
            }
            for relation in self.relations(&name, raw.relations)? {
                record = record.with_relation(relation);
            }
            catalog.register(record)?;
        }
        Ok(())
    }

    fn attributes(
        &self,
        owner: &str,
        raw: Vec<RawAttribute>,
    ) -> Result<Vec<Attribute>, ManifestError> {
        raw.into_iter()
            .map(|raw| {
                let (storage_type, length, precision) =
                    parse_type(&raw.ty).map_err(|reason| ManifestError::InvalidType {
                        owner: owner.to_string(),
                        attribute: raw.name.clone(),
                        ty: raw.ty.clone(),
                        reason,
                    })?;
                Ok(Attribute {
                    name: raw.name,
                    storage_type,
                    length: raw.length.or(length),
                    nullable: raw.nullable,
                    default: raw.default,
                    primary_key: raw.primary_key,
                    generated: raw.generated,
                    unique: raw.unique,
                    precision: raw.precision.or(precision.map(|(p, _)| p)),
                    scale: raw.scale.or(precision.and_then(|(_, s)| s)),
                    description: raw.description,
                })
            })
            .collect()
    }

    fn relations(
        &self,
        owner: &str,
        raw: Vec<RawRelation>,
    ) -> Result<Vec<Relation>, ManifestError> {
        raw.into_iter()
            .map(|raw| {
                let cardinality: Cardinality =
                    raw.cardinality
                        .parse()
                        .map_err(|reason| ManifestError::InvalidCardinality {
                            owner: owner.to_string(),
                            relation: raw.name.clone(),
                            reason,
                        })?;
                let on_delete = raw
                    .on_delete
                    .as_deref()
                    .map(|action| {
                        action.parse::<ReferentialAction>().map_err(|reason| {
                            ManifestError::InvalidReferentialAction {
                                owner: owner.to_string(),
                                relation: raw.name.clone(),
                                action: action.to_string(),
                                reason,
                            }
                        })
                    })
                    .transpose()?;
                let mut relation =
                    Relation::new(raw.name, self.mapping.normalize(&raw.target), cardinality);
                if let Some(nullable) = raw.nullable {
                    relation.nullable = nullable;
                }
                relation.mapped_by = raw.mapped_by;
                relation.inversed_by = raw.inversed_by;
                relation.join_column = raw.join_column;
                relation.join_table = raw.join_table;
                relation.on_delete = on_delete;
                Ok(relation)
            })
            .collect()
    }
}
