//! Attribute model for the SDK

use super::enums::StorageType;
use serde::{Deserialize, Serialize};

/// Attribute descriptor: one persisted field of a record type
///
/// Attributes are plain data. They are declared once on a field-set unit or
/// a record type and copied into effective schemas during composition.
///
/// # Example
///
/// ```rust
/// use schema_compose::models::{Attribute, StorageType};
///
/// let firstname = Attribute::new("firstname", StorageType::String).with_length(50);
/// assert_eq!(firstname.length, Some(50));
/// assert!(!firstname.nullable);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    /// Attribute (and column) name
    pub name: String,
    /// Logical storage type
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Maximum length for string/binary types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Whether the column allows NULL values (default: false)
    #[serde(default)]
    pub nullable: bool,
    /// Default value, rendered as a SQL literal on export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub primary_key: bool,
    /// Value generated by the database (auto increment / identity)
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Attribute {
    /// Create a non-nullable attribute with no length or default
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
            length: None,
            nullable: false,
            default: None,
            primary_key: false,
            generated: false,
            unique: false,
            precision: None,
            scale: None,
            description: String::new(),
        }
    }

    /// Generated integer primary key, the usual `id` attribute
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Integer)
            .primary()
            .generated()
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Render the SQL column type for a dialect
    pub fn sql_type(&self, dialect: &str) -> String {
        self.storage_type
            .sql_type(dialect, self.length, self.precision, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_defaults() {
        let attr = Attribute::new("email", StorageType::String);
        assert!(!attr.nullable);
        assert!(!attr.primary_key);
        assert_eq!(attr.length, None);
        assert_eq!(attr.sql_type("postgres"), "VARCHAR(255)");
    }

    #[test]
    fn test_attribute_deserialize_uses_type_key() {
        let yaml = "name: price\ntype: decimal\nprecision: 10\nscale: 2\n";
        let attr: Attribute = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(attr.storage_type, StorageType::Decimal);
        assert_eq!(attr.sql_type("standard"), "DECIMAL(10, 2)");
    }
}
