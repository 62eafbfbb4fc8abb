//! Field value coercion by target type
//!
//! Coercions follow loose scripting-language conversion rules: numbers
//! parse from text, checkboxes use truthiness, text renders scalars. A
//! missing value stays `null` for every target except checkbox, which
//! becomes `false`.

use crate::store::value::{epoch_millis, format_datetime, is_absent, number_to_json, to_json};
use crate::types::{FieldTypeCode, JsonValue};
use bson::{Bson, Document};

/// Look up a mapped value: by name first, then by id when the name yields nothing
pub fn lookup<'a>(document: &'a Document, name: &str, id: &str) -> Option<&'a Bson> {
    document
        .get(name)
        .filter(|value| !is_absent(value))
        .or_else(|| document.get(id).filter(|value| !is_absent(value)))
}

/// Coerce a raw value to the shape expected by `target`.
///
/// `None` as target (absent or unrecognised code) only converts temporal
/// values to epoch milliseconds.
pub fn coerce(value: Option<&Bson>, target: Option<FieldTypeCode>) -> JsonValue {
    let Some(target) = target else {
        return value.map_or(JsonValue::Null, temporal_or_raw);
    };

    match target {
        FieldTypeCode::Checkbox => JsonValue::Bool(value.is_some_and(truthy)),
        _ => match value {
            None => JsonValue::Null,
            Some(value) => coerce_present(value, target),
        },
    }
}

fn coerce_present(value: &Bson, target: FieldTypeCode) -> JsonValue {
    match target {
        FieldTypeCode::Text | FieldTypeCode::SingleSelect => to_json(value),
        FieldTypeCode::Number
        | FieldTypeCode::Currency
        | FieldTypeCode::Progress
        | FieldTypeCode::Rating => to_number(value).map_or(JsonValue::Null, number_to_json),
        FieldTypeCode::MultiSelect => match value {
            Bson::Array(_) => to_json(value),
            scalar => JsonValue::Array(vec![to_json(scalar)]),
        },
        FieldTypeCode::Date => temporal_or_raw(value),
        FieldTypeCode::Barcode | FieldTypeCode::Phone | FieldTypeCode::Url => {
            JsonValue::String(to_text(value))
        }
        FieldTypeCode::Checkbox => JsonValue::Bool(truthy(value)),
        FieldTypeCode::Object | FieldTypeCode::Array => temporal_or_raw(value),
    }
}

fn temporal_or_raw(value: &Bson) -> JsonValue {
    epoch_millis(value).map_or_else(|| to_json(value), JsonValue::from)
}

/// Numeric form of a value; `None` where no number exists
pub fn to_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f).filter(|f| f.is_finite()),
        Bson::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Bson::String(s) => parse_number(s),
        Bson::DateTime(dt) => Some(dt.timestamp_millis() as f64),
        Bson::Decimal128(_) => match value.clone().into_relaxed_extjson() {
            JsonValue::Object(map) => map
                .get("$numberDecimal")
                .and_then(JsonValue::as_str)
                .and_then(parse_number),
            _ => None,
        },
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Text form of a value
pub fn to_text(value: &Bson) -> String {
    match value {
        Bson::String(s) | Bson::Symbol(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::DateTime(dt) => format_datetime(*dt),
        Bson::Null | Bson::Undefined => String::new(),
        other => match to_json(other) {
            JsonValue::String(s) => s,
            json => json.to_string(),
        },
    }
}

/// Truthiness of a value
pub fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => false,
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(f) => *f != 0.0 && !f.is_nan(),
        Bson::String(s) => !s.is_empty(),
        _ => true,
    }
}
