//! Common types used throughout the connector
//!
//! The field-type enumeration is the contract surface shared with the
//! consumers of table metadata and records. Codes are published values
//! and must never be renumbered.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Lenient Scalars
// ============================================================================

/// Integer that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    /// Integer value, if representable
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for NumberOrString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberOrString::Number(n) => write!(f, "{n}"),
            NumberOrString::Text(s) => write!(f, "{s}"),
        }
    }
}

// ============================================================================
// Field Type Codes
// ============================================================================

/// UI-facing field kind with a stable integer id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FieldTypeCode {
    Text,
    Number,
    SingleSelect,
    MultiSelect,
    Date,
    Barcode,
    Checkbox,
    Currency,
    Phone,
    Url,
    Progress,
    Rating,
    Object,
    Array,
}

impl FieldTypeCode {
    /// All codes in id order
    pub const ALL: [FieldTypeCode; 14] = [
        FieldTypeCode::Text,
        FieldTypeCode::Number,
        FieldTypeCode::SingleSelect,
        FieldTypeCode::MultiSelect,
        FieldTypeCode::Date,
        FieldTypeCode::Barcode,
        FieldTypeCode::Checkbox,
        FieldTypeCode::Currency,
        FieldTypeCode::Phone,
        FieldTypeCode::Url,
        FieldTypeCode::Progress,
        FieldTypeCode::Rating,
        FieldTypeCode::Object,
        FieldTypeCode::Array,
    ];

    /// Published integer id
    pub fn code(self) -> u8 {
        match self {
            FieldTypeCode::Text => 1,
            FieldTypeCode::Number => 2,
            FieldTypeCode::SingleSelect => 3,
            FieldTypeCode::MultiSelect => 4,
            FieldTypeCode::Date => 5,
            FieldTypeCode::Barcode => 6,
            FieldTypeCode::Checkbox => 7,
            FieldTypeCode::Currency => 8,
            FieldTypeCode::Phone => 9,
            FieldTypeCode::Url => 10,
            FieldTypeCode::Progress => 11,
            FieldTypeCode::Rating => 12,
            FieldTypeCode::Object => 13,
            FieldTypeCode::Array => 14,
        }
    }

    /// Look up a code by its integer id
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| i64::from(t.code()) == code)
    }
}

impl From<FieldTypeCode> for u8 {
    fn from(value: FieldTypeCode) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for FieldTypeCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value)).ok_or_else(|| format!("unknown field type code {value}"))
    }
}

impl std::fmt::Display for FieldTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldTypeCode::Text => "text",
            FieldTypeCode::Number => "number",
            FieldTypeCode::SingleSelect => "singleSelect",
            FieldTypeCode::MultiSelect => "multiSelect",
            FieldTypeCode::Date => "date",
            FieldTypeCode::Barcode => "barcode",
            FieldTypeCode::Checkbox => "checkbox",
            FieldTypeCode::Currency => "currency",
            FieldTypeCode::Phone => "phone",
            FieldTypeCode::Url => "url",
            FieldTypeCode::Progress => "progress",
            FieldTypeCode::Rating => "rating",
            FieldTypeCode::Object => "object",
            FieldTypeCode::Array => "array",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Value Categories
// ============================================================================

/// Runtime category of an observed document value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueCategory {
    Null,
    Sequence,
    Temporal,
    Boolean,
    Numeric,
    Text,
    Structured,
}

impl ValueCategory {
    /// Field type assigned to a resolved category.
    ///
    /// `Null` has no mapping of its own and falls back to `Object`.
    pub fn field_type(self) -> FieldTypeCode {
        match self {
            ValueCategory::Text => FieldTypeCode::Text,
            ValueCategory::Numeric => FieldTypeCode::Number,
            ValueCategory::Boolean => FieldTypeCode::Checkbox,
            ValueCategory::Temporal => FieldTypeCode::Date,
            ValueCategory::Sequence => FieldTypeCode::Array,
            ValueCategory::Structured | ValueCategory::Null => FieldTypeCode::Object,
        }
    }

    /// Unify a category already recorded for a field with a new observation.
    ///
    /// Null never overrides a concrete category, and a field seen only as
    /// null so far takes the first concrete category observed. Two distinct
    /// concrete categories collapse to `Structured`.
    pub fn unify(self, observed: ValueCategory) -> ValueCategory {
        match (self, observed) {
            (current, ValueCategory::Null) => current,
            (ValueCategory::Null, observed) => observed,
            (current, observed) if current == observed => current,
            _ => ValueCategory::Structured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<u8> = FieldTypeCode::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, (1..=14).collect::<Vec<u8>>());
        assert_eq!(FieldTypeCode::Checkbox.code(), 7);
        assert_eq!(FieldTypeCode::Object.code(), 13);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(FieldTypeCode::from_code(5), Some(FieldTypeCode::Date));
        assert_eq!(FieldTypeCode::from_code(0), None);
        assert_eq!(FieldTypeCode::from_code(15), None);
        assert_eq!(FieldTypeCode::from_code(-1), None);
    }

    #[test]
    fn test_serde_as_integer() {
        let json = serde_json::to_string(&FieldTypeCode::MultiSelect).unwrap();
        assert_eq!(json, "4");

        let parsed: FieldTypeCode = serde_json::from_str("10").unwrap();
        assert_eq!(parsed, FieldTypeCode::Url);

        assert!(serde_json::from_str::<FieldTypeCode>("99").is_err());
    }

    #[test]
    fn test_number_or_string() {
        let n: NumberOrString = serde_json::from_str("27017").unwrap();
        assert_eq!(n.as_i64(), Some(27017));

        let s: NumberOrString = serde_json::from_str("\" 100 \"").unwrap();
        assert_eq!(s.as_i64(), Some(100));

        let f: NumberOrString = serde_json::from_str("2.0").unwrap();
        assert_eq!(f.as_i64(), Some(2));

        let bad: NumberOrString = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(bad.as_i64(), None);
        assert_eq!(bad.to_string(), "abc");
    }

    #[test]
    fn test_category_field_types() {
        assert_eq!(ValueCategory::Text.field_type(), FieldTypeCode::Text);
        assert_eq!(ValueCategory::Numeric.field_type(), FieldTypeCode::Number);
        assert_eq!(ValueCategory::Boolean.field_type(), FieldTypeCode::Checkbox);
        assert_eq!(ValueCategory::Temporal.field_type(), FieldTypeCode::Date);
        assert_eq!(ValueCategory::Sequence.field_type(), FieldTypeCode::Array);
        assert_eq!(ValueCategory::Structured.field_type(), FieldTypeCode::Object);
        assert_eq!(ValueCategory::Null.field_type(), FieldTypeCode::Object);
    }

    #[test]
    fn test_unify() {
        use ValueCategory::*;

        assert_eq!(Boolean.unify(Null), Boolean);
        assert_eq!(Text.unify(Text), Text);
        assert_eq!(Text.unify(Numeric), Structured);
        assert_eq!(Structured.unify(Text), Structured);
        assert_eq!(Null.unify(Null), Null);
        assert_eq!(Null.unify(Boolean), Boolean);
        assert_eq!(Sequence.unify(Temporal), Structured);
    }
}
