//! Models module for the SDK
//!
//! Defines the declarative descriptors composed by the library: attributes,
//! relations, field-set units, record types, and the effective schema
//! produced by composition.

pub mod attribute;
pub mod effective;
pub mod enums;
pub mod field_set;
pub mod member;
pub mod record_type;
pub mod relation;

pub use attribute::Attribute;
pub use effective::{EffectiveSchema, Origin, catalog_fingerprint};
pub use enums::*;
pub use field_set::FieldSet;
pub use member::Member;
pub use record_type::{RecordType, default_table_name};
pub use relation::Relation;
