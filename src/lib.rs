//! schema-compose - Field-set composition for extensible record definitions
//!
//! Provides:
//! - Field-set units: named, reusable groups of attributes and relations
//! - Record types that incorporate units and override their members
//! - Composition of record types into effective schemas
//! - Export (DDL, JSON descriptors) and schema synchronizer adapters
//! - Validation logic
//!
//! # Example
//!
//! ```rust
//! use schema_compose::{Attribute, Catalog, Composer, FieldSet, RecordType, StorageType};
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .define(FieldSet::new(
//!         "UserTrait",
//!         vec![
//!             Attribute::id("id"),
//!             Attribute::new("firstname", StorageType::String).with_length(50),
//!         ],
//!         vec![],
//!     ))
//!     .unwrap();
//! catalog
//!     .register(
//!         RecordType::new("User2")
//!             .uses("UserTrait")
//!             .with_attribute(Attribute::new("firstname", StorageType::String).with_length(100)),
//!     )
//!     .unwrap();
//!
//! let schema = Composer::new(&catalog).compose("User2").unwrap();
//! assert_eq!(schema.attribute("firstname").unwrap().length, Some(100));
//! ```

pub mod compose;
pub mod config;
pub mod export;
pub mod manifest;
pub mod models;
pub mod registry;
pub mod sync;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use compose::{ComposeError, Composer, ConflictPolicy};
pub use config::{ConfigError, MappingConfig, Settings, SyncConfig};
pub use export::{ExportError, ExportResult, JsonExporter, SQLExporter};
pub use manifest::{ManifestError, ManifestLoader};
pub use registry::{Catalog, RegistryError};
pub use sync::{
    CommandSynchronizer, SchemaSynchronizer, ScriptSynchronizer, SyncError, SyncReport, prepare,
};
pub use validation::{
    RelationshipValidationError, RelationshipValidationResult, ValidationReport,
    validate_catalog,
};

// Re-export models
pub use models::enums::*;
pub use models::{Attribute, EffectiveSchema, FieldSet, Member, Origin, RecordType, Relation};
