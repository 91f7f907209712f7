//! Remote table rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column values of a row, keyed by column name.
pub type Fields = serde_json::Map<String, Value>;

/// Reference to a remote table by its store identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRef(String);

impl TableRef {
    /// Create a table reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The store identifier of the table.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier requested when creating a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowId {
    /// Let the store assign a fresh identifier.
    #[default]
    Unique,
    /// Use a caller-chosen identifier.
    Custom(String),
}

impl RowId {
    /// Wire form of the identifier. `unique()` asks the store to generate one.
    pub fn as_wire(&self) -> &str {
        match self {
            RowId::Unique => "unique()",
            RowId::Custom(id) => id,
        }
    }
}

/// A row as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRow {
    /// Store-assigned identifier.
    #[serde(rename = "$id")]
    pub id: String,
    /// Column values, including any `$`-prefixed metadata the store returns.
    #[serde(flatten)]
    pub fields: Fields,
}

impl RemoteRow {
    /// Create a row with the given identifier and fields.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Get a column value.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Get a string column value.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }
}
