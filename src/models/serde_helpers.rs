//! Helpers for reading loosely-typed JSON records
//!
//! Records loaded from the document store or localStorage may carry numbers
//! as strings, floats, or not at all. These helpers coerce them the way the
//! store's writers produce them and reject anything that is not a finite,
//! non-negative integer.

use serde_json::Value;

/// Largest integer a JS number represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Coerce a JSON value to a finite number (numbers and numeric strings)
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce to a non-negative integer index, truncating any fraction
pub fn coerce_index(value: &Value) -> Option<usize> {
    index_from_f64(coerce_number(value)?)
}

/// Validate a JS number as a token/block index
pub fn index_from_f64(n: f64) -> Option<usize> {
    if !n.is_finite() {
        return None;
    }
    let t = n.trunc();
    if t < 0.0 || t > MAX_SAFE_INTEGER as f64 {
        return None;
    }
    Some(t as usize)
}

/// Coerce to a trimmed string (numbers are stringified, null/missing is empty)
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Like `coerce_string` but keeps surrounding whitespace (free text)
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce a timestamp; missing, zero and non-finite values become `None`
pub fn coerce_millis(value: Option<&Value>) -> Option<i64> {
    let n = coerce_number(value?)?;
    if n == 0.0 {
        return None;
    }
    Some(n as i64)
}
