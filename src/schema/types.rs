//! Schema types

use crate::types::{FieldTypeCode, JsonObject};
use serde::{Deserialize, Serialize};

/// One inferred field of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Synthetic sequential id (`fid_1`, `fid_2`, ...)
    pub field_id: String,

    /// Source field name
    pub field_name: String,

    /// Field type code
    pub field_type: FieldTypeCode,

    /// Whether this field is the table's identity
    pub is_primary: bool,

    /// Description (empty by default)
    #[serde(default)]
    pub description: String,

    /// Extensible field properties (empty by default)
    #[serde(default)]
    pub property: JsonObject,
}

impl FieldDescriptor {
    /// Create a field descriptor with the `fid_{index}` id
    pub fn new(index: usize, field_name: impl Into<String>, field_type: FieldTypeCode) -> Self {
        Self {
            field_id: format!("fid_{index}"),
            field_name: field_name.into(),
            field_type,
            is_primary: false,
            description: String::new(),
            property: JsonObject::new(),
        }
    }

    /// Mark this field as primary
    #[must_use]
    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Inferred table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    /// Collection name
    pub table_name: String,

    /// Fields in first-seen order
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Create an empty schema
    pub fn empty(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }
}
