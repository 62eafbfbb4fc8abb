//! BSON value helpers
//!
//! Classification of raw document values into [`ValueCategory`] and
//! rendering of BSON into the JSON shapes returned to callers.

use crate::types::{JsonValue, ValueCategory};
use bson::Bson;
use chrono::SecondsFormat;

/// Classify a document value.
///
/// Arrays and temporal values are recognised before any scalar kind.
pub fn classify(value: &Bson) -> ValueCategory {
    match value {
        Bson::Null | Bson::Undefined => ValueCategory::Null,
        Bson::Array(_) => ValueCategory::Sequence,
        Bson::DateTime(_) | Bson::Timestamp(_) => ValueCategory::Temporal,
        Bson::Boolean(_) => ValueCategory::Boolean,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => {
            ValueCategory::Numeric
        }
        Bson::String(_) | Bson::Symbol(_) | Bson::ObjectId(_) => ValueCategory::Text,
        _ => ValueCategory::Structured,
    }
}

/// Whether a value carries nothing
pub fn is_absent(value: &Bson) -> bool {
    matches!(value, Bson::Null | Bson::Undefined)
}

/// Milliseconds since the Unix epoch for temporal values
pub fn epoch_millis(value: &Bson) -> Option<i64> {
    match value {
        Bson::DateTime(dt) => Some(dt.timestamp_millis()),
        Bson::Timestamp(ts) => Some(i64::from(ts.time) * 1000),
        _ => None,
    }
}

/// String form of an identity value, as used for `primaryId` and page tokens
pub fn stringify_id(value: &Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) | Bson::Symbol(s) => s.clone(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(f) => format_number(*f),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null | Bson::Undefined => "null".to_string(),
        Bson::DateTime(dt) => format_datetime(*dt),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// Render a BSON value as JSON without type coercion
pub fn to_json(value: &Bson) -> JsonValue {
    match value {
        Bson::Null | Bson::Undefined => JsonValue::Null,
        Bson::Boolean(b) => JsonValue::Bool(*b),
        Bson::Int32(n) => JsonValue::from(*n),
        Bson::Int64(n) => JsonValue::from(*n),
        Bson::Double(f) => number_to_json(*f),
        Bson::String(s) | Bson::Symbol(s) => JsonValue::String(s.clone()),
        Bson::ObjectId(oid) => JsonValue::String(oid.to_hex()),
        Bson::DateTime(dt) => JsonValue::String(format_datetime(*dt)),
        Bson::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Bson::Document(doc) => JsonValue::Object(
            doc.iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// JSON number for a float, collapsing integral values to integers.
///
/// NaN and infinities have no JSON form and become `null`.
pub fn number_to_json(value: f64) -> JsonValue {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;

    if value.fract() == 0.0 && value.abs() <= MAX_SAFE {
        JsonValue::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
    }
}

fn format_number(value: f64) -> String {
    match number_to_json(value) {
        JsonValue::Null => value.to_string(),
        n => n.to_string(),
    }
}

/// ISO 8601 UTC with millisecond precision
pub fn format_datetime(dt: bson::DateTime) -> String {
    dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, Timestamp};
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&Bson::Null), ValueCategory::Null);
        assert_eq!(classify(&Bson::Array(vec![])), ValueCategory::Sequence);
        assert_eq!(
            classify(&Bson::DateTime(bson::DateTime::from_millis(0))),
            ValueCategory::Temporal
        );
        assert_eq!(
            classify(&Bson::Timestamp(Timestamp { time: 1, increment: 0 })),
            ValueCategory::Temporal
        );
        assert_eq!(classify(&Bson::Boolean(true)), ValueCategory::Boolean);
        assert_eq!(classify(&Bson::Int32(1)), ValueCategory::Numeric);
        assert_eq!(classify(&Bson::Int64(1)), ValueCategory::Numeric);
        assert_eq!(classify(&Bson::Double(1.5)), ValueCategory::Numeric);
        assert_eq!(classify(&Bson::String("a".into())), ValueCategory::Text);
        assert_eq!(classify(&Bson::ObjectId(ObjectId::new())), ValueCategory::Text);
        assert_eq!(
            classify(&Bson::Document(doc! { "a": 1 })),
            ValueCategory::Structured
        );
    }

    #[test]
    fn test_epoch_millis() {
        let dt = bson::DateTime::from_millis(1_705_314_600_000);
        assert_eq!(epoch_millis(&Bson::DateTime(dt)), Some(1_705_314_600_000));
        assert_eq!(
            epoch_millis(&Bson::Timestamp(Timestamp { time: 10, increment: 3 })),
            Some(10_000)
        );
        assert_eq!(epoch_millis(&Bson::String("2024-01-15".into())), None);
    }

    #[test]
    fn test_stringify_id() {
        let oid = ObjectId::parse_str("65a4f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(stringify_id(&Bson::ObjectId(oid)), "65a4f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(stringify_id(&Bson::String("user-1".into())), "user-1");
        assert_eq!(stringify_id(&Bson::Int32(42)), "42");
        assert_eq!(stringify_id(&Bson::Int64(7)), "7");
        assert_eq!(stringify_id(&Bson::Double(3.0)), "3");
        assert_eq!(stringify_id(&Bson::Double(2.5)), "2.5");
    }

    #[test]
    fn test_to_json() {
        let oid = ObjectId::parse_str("65a4f0c2e4b0a1b2c3d4e5f6").unwrap();
        let dt = bson::DateTime::from_millis(1_705_314_600_000);
        let value = Bson::Document(doc! {
            "owner": oid,
            "at": dt,
            "tags": ["a", 1_i32],
            "ratio": 0.5,
            "whole": 2.0,
            "missing": Bson::Null,
        });

        assert_eq!(
            to_json(&value),
            json!({
                "owner": "65a4f0c2e4b0a1b2c3d4e5f6",
                "at": "2024-01-15T10:30:00.000Z",
                "tags": ["a", 1],
                "ratio": 0.5,
                "whole": 2,
                "missing": null
            })
        );
    }

    #[test]
    fn test_number_to_json() {
        assert_eq!(number_to_json(3.0), json!(3));
        assert_eq!(number_to_json(-1.25), json!(-1.25));
        assert_eq!(number_to_json(f64::NAN), JsonValue::Null);
        assert_eq!(number_to_json(f64::INFINITY), JsonValue::Null);
    }
}
