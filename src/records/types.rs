//! Record fetch request and response types

use crate::connection::ConnectionParams;
use crate::error::{Error, Result, ResultExt};
use crate::types::{FieldTypeCode, JsonObject, JsonValue, NumberOrString};
use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Caller-declared projection of one source field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Target key in `Record::data`, also the fallback lookup key
    pub source_field_id: String,

    /// Primary lookup key in the source document
    #[serde(default)]
    pub source_field_name: String,

    /// Target field type code, when given
    #[serde(default)]
    pub target_field_type: Option<NumberOrString>,

    /// Only enabled mappings are applied
    #[serde(default)]
    pub enabled: bool,
}

impl FieldMapping {
    /// Create an enabled mapping
    pub fn new(
        source_field_id: impl Into<String>,
        source_field_name: impl Into<String>,
        target: FieldTypeCode,
    ) -> Self {
        Self {
            source_field_id: source_field_id.into(),
            source_field_name: source_field_name.into(),
            target_field_type: Some(NumberOrString::Number(target.code().into())),
            enabled: true,
        }
    }

    /// Disable this mapping
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Target type, `None` for absent or unrecognised codes
    pub fn target_type(&self) -> Option<FieldTypeCode> {
        self.target_field_type
            .as_ref()
            .and_then(NumberOrString::as_i64)
            .and_then(FieldTypeCode::from_code)
    }
}

/// Connection plus field mappings for one table
#[derive(Debug, Clone)]
pub struct DatasourceConfig {
    pub db_config: ConnectionParams,
    pub field_mappings: Vec<FieldMapping>,
}

impl DatasourceConfig {
    /// Resolve a config given either as an object or as a JSON string
    pub fn resolve(value: &JsonValue) -> Result<Self> {
        Self::resolve_inner(value).context("Failed to parse datasourceConfig")
    }

    fn resolve_inner(value: &JsonValue) -> Result<Self> {
        let parsed;
        let object = match value {
            JsonValue::Object(map) => map,
            JsonValue::String(text) => {
                parsed = serde_json::from_str::<JsonValue>(text)?;
                parsed.as_object().ok_or_else(|| {
                    Error::config("datasourceConfig must be a valid JSON string or object")
                })?
            }
            _ => {
                return Err(Error::config(
                    "datasourceConfig must be a valid JSON string or object",
                ))
            }
        };

        let db_config = present(object, "dbConfig")?;
        let field_mappings = present(object, "fieldMappings")?;

        Ok(Self {
            db_config: ConnectionParams::from_value(db_config.clone())?,
            field_mappings: serde_json::from_value(field_mappings.clone())?,
        })
    }

    /// Mappings that will be applied
    pub fn enabled_mappings(&self) -> impl Iterator<Item = &FieldMapping> {
        self.field_mappings.iter().filter(|m| m.enabled)
    }
}

fn present<'a>(object: &'a JsonObject, field: &str) -> Result<&'a JsonValue> {
    match object.get(field) {
        Some(JsonValue::Null) | None => Err(Error::config(format!(
            "datasourceConfig is missing required fields: {field}"
        ))),
        Some(value) => Ok(value),
    }
}

/// Input of a record fetch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsRequest {
    /// Object or JSON string holding `dbConfig` and `fieldMappings`
    #[serde(default)]
    pub datasource_config: JsonValue,

    /// Exclusive lower bound on the identity field; empty for the first page
    #[serde(default)]
    pub page_token: Option<String>,

    /// Maximum records per page
    #[serde(default)]
    pub max_page_size: Option<NumberOrString>,
}

impl RecordsRequest {
    /// Create a request for the first page
    pub fn new(datasource_config: JsonValue) -> Self {
        Self {
            datasource_config,
            page_token: None,
            max_page_size: None,
        }
    }

    /// Continue from a previous page
    #[must_use]
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = Some(NumberOrString::Number(size.into()));
        self
    }

    /// Page token, empty when absent
    pub fn page_token(&self) -> &str {
        self.page_token.as_deref().unwrap_or_default()
    }

    /// Validated page size
    pub fn page_size(&self) -> Result<usize> {
        let Some(raw) = &self.max_page_size else {
            return Ok(DEFAULT_PAGE_SIZE);
        };

        raw.as_i64()
            .filter(|n| *n >= 1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| Error::invalid_value("maxPageSize", format!("expected a positive integer, got '{raw}'")))
    }
}

/// One projected document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stringified identity value
    pub primary_id: String,

    /// Coerced values keyed by `sourceFieldId`
    pub data: JsonObject,
}

/// One page of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    /// Identity of the last returned record when more pages exist, else empty
    pub next_page_token: String,

    /// Whether another page exists
    pub has_more: bool,

    /// Records in identity order
    pub records: Vec<Record>,
}
