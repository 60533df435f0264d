//! Enumerations shared by the model types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical storage type of an attribute.
///
/// Dialect-specific SQL types are derived at export time, see
/// [`StorageType::sql_type`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Integer,
    SmallInt,
    BigInt,
    String,
    Text,
    Boolean,
    Decimal,
    Float,
    Date,
    DateTime,
    Time,
    Json,
    Uuid,
    Binary,
}

/// Default VARCHAR length when a string attribute declares none
pub const DEFAULT_STRING_LENGTH: u32 = 255;

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Integer => "integer",
            StorageType::SmallInt => "small_int",
            StorageType::BigInt => "big_int",
            StorageType::String => "string",
            StorageType::Text => "text",
            StorageType::Boolean => "boolean",
            StorageType::Decimal => "decimal",
            StorageType::Float => "float",
            StorageType::Date => "date",
            StorageType::DateTime => "date_time",
            StorageType::Time => "time",
            StorageType::Json => "json",
            StorageType::Uuid => "uuid",
            StorageType::Binary => "binary",
        }
    }

    /// Whether `length` is meaningful for this type
    pub fn takes_length(&self) -> bool {
        matches!(self, StorageType::String | StorageType::Binary)
    }

    /// Render the SQL column type for a dialect.
    ///
    /// `length` applies to string and binary columns; `precision`/`scale`
    /// apply to decimals.
    pub fn sql_type(
        &self,
        dialect: &str,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> String {
        let postgres = matches!(dialect, "postgres" | "postgresql");
        let mysql = dialect == "mysql";
        let sqlserver = matches!(dialect, "sqlserver" | "mssql");

        match self {
            StorageType::Integer => "INT".to_string(),
            StorageType::SmallInt => "SMALLINT".to_string(),
            StorageType::BigInt => "BIGINT".to_string(),
            StorageType::String => {
                let len = length.unwrap_or(DEFAULT_STRING_LENGTH);
                if sqlserver {
                    format!("NVARCHAR({})", len)
                } else {
                    format!("VARCHAR({})", len)
                }
            }
            StorageType::Text => {
                if sqlserver {
                    "NVARCHAR(MAX)".to_string()
                } else if mysql {
                    "LONGTEXT".to_string()
                } else {
                    "TEXT".to_string()
                }
            }
            StorageType::Boolean => {
                if sqlserver {
                    "BIT".to_string()
                } else if mysql {
                    "TINYINT(1)".to_string()
                } else {
                    "BOOLEAN".to_string()
                }
            }
            StorageType::Decimal => match (precision, scale) {
                (Some(p), Some(s)) => format!("DECIMAL({}, {})", p, s),
                (Some(p), None) => format!("DECIMAL({})", p),
                _ => "DECIMAL(10, 0)".to_string(),
            },
            StorageType::Float => {
                if postgres {
                    "DOUBLE PRECISION".to_string()
                } else {
                    "FLOAT".to_string()
                }
            }
            StorageType::Date => "DATE".to_string(),
            StorageType::DateTime => {
                if sqlserver || mysql {
                    "DATETIME".to_string()
                } else {
                    "TIMESTAMP".to_string()
                }
            }
            StorageType::Time => "TIME".to_string(),
            StorageType::Json => {
                if postgres {
                    "JSONB".to_string()
                } else if sqlserver {
                    "NVARCHAR(MAX)".to_string()
                } else {
                    "JSON".to_string()
                }
            }
            StorageType::Uuid => {
                if postgres {
                    "UUID".to_string()
                } else if sqlserver {
                    "UNIQUEIDENTIFIER".to_string()
                } else {
                    "CHAR(36)".to_string()
                }
            }
            StorageType::Binary => {
                if postgres {
                    "BYTEA".to_string()
                } else {
                    match length {
                        Some(len) => format!("VARBINARY({})", len),
                        None if mysql => "BLOB".to_string(),
                        None => "VARBINARY(255)".to_string(),
                    }
                }
            }
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Ok(StorageType::Integer),
            "smallint" | "small_int" => Ok(StorageType::SmallInt),
            "bigint" | "big_int" => Ok(StorageType::BigInt),
            "string" | "varchar" => Ok(StorageType::String),
            "text" => Ok(StorageType::Text),
            "boolean" | "bool" => Ok(StorageType::Boolean),
            "decimal" | "numeric" => Ok(StorageType::Decimal),
            "float" | "double" => Ok(StorageType::Float),
            "date" => Ok(StorageType::Date),
            "datetime" | "date_time" | "timestamp" => Ok(StorageType::DateTime),
            "time" => Ok(StorageType::Time),
            "json" => Ok(StorageType::Json),
            "uuid" | "guid" => Ok(StorageType::Uuid),
            "binary" | "blob" => Ok(StorageType::Binary),
            other => Err(format!("unknown storage type: {}", other)),
        }
    }
}

/// Cardinality of a relationship, seen from the declaring record type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::ManyToOne => "many_to_one",
            Cardinality::OneToOne => "one_to_one",
            Cardinality::OneToMany => "one_to_many",
            Cardinality::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "many_to_one" | "manytoone" => Ok(Cardinality::ManyToOne),
            "one_to_one" | "onetoone" => Ok(Cardinality::OneToOne),
            "one_to_many" | "onetomany" => Ok(Cardinality::OneToMany),
            "many_to_many" | "manytomany" => Ok(Cardinality::ManyToMany),
            other => Err(format!("unknown cardinality: {}", other)),
        }
    }
}

/// Action taken on referencing rows when the referenced row is deleted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    /// SQL keywords of the action
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ReferentialAction {
    type Err = String;

    /// Accepts the SQL keywords in any case, with words separated by
    /// spaces, underscores or hyphens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "cascade" => Ok(ReferentialAction::Cascade),
            "set null" => Ok(ReferentialAction::SetNull),
            "set default" => Ok(ReferentialAction::SetDefault),
            "restrict" => Ok(ReferentialAction::Restrict),
            "no action" => Ok(ReferentialAction::NoAction),
            _ => Err(format!("unknown referential action: {}", s.trim())),
        }
    }
}
