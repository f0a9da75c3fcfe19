//! Numeric helpers shared by the patch and standings code.
//!
//! Documents arrive from an external generator, so numbers may show up as
//! JSON numbers, numeric strings or booleans. Everything is folded into
//! `f64` here and written back as an integer whenever the value is integral.

use serde::Serializer;
use serde_json::{Number, Value};

/// Largest magnitude written back as a JSON integer.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Read a JSON number, rejecting every other shape.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Loose numeric coercion: numbers, numeric strings and booleans.
/// Anything else coerces to `0.0`.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(_) => as_number(value).unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Read a non-negative integer (round numbers, positions) from a number or a
/// numeric string.
pub fn as_index(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(_) => as_number(value)?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= u32::MAX as f64 {
        Some(raw as u32)
    } else {
        None
    }
}

/// Convert back to a JSON value, preferring integers.
pub fn to_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INT {
        Value::Number(Number::from(v as i64))
    } else {
        Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// `serialize_with` adapter so integral totals serialize as `25`, not `25.0`.
pub fn serialize_compact<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INT {
        serializer.serialize_i64(*v as i64)
    } else {
        serializer.serialize_f64(*v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number_shapes() {
        assert_eq!(coerce_number(&json!(3)), 3.0);
        assert_eq!(coerce_number(&json!("-2.5")), -2.5);
        assert_eq!(coerce_number(&json!(" 4 ")), 4.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!("fast")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!({"a": 1})), 0.0);
    }

    #[test]
    fn test_to_value_prefers_integers() {
        assert_eq!(to_value(25.0), json!(25));
        assert_eq!(to_value(-3.0), json!(-3));
        assert_eq!(to_value(0.5), json!(0.5));
    }

    #[test]
    fn test_as_index() {
        assert_eq!(as_index(&json!(3)), Some(3));
        assert_eq!(as_index(&json!("7")), Some(7));
        assert_eq!(as_index(&json!(2.5)), None);
        assert_eq!(as_index(&json!(-1)), None);
        assert_eq!(as_index(&json!("P3")), None);
    }
}
