//! Host value model for the encoding engine.
//!
//! The engine is polymorphic over a closed set of value shapes. Callers
//! convert their application data into [`Value`] once, at the boundary;
//! encoders inspect only as much shape as they need to dispatch.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// A value to be encoded into PostgreSQL text format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    /// Shape name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }

    /// Generic string coercion.
    ///
    /// Every value shape has a text form; this is the fallback the string
    /// encoder delegates to, and the form composite encoders quote.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => String::from(if *b { "true" } else { "false" }),
            Value::Int(n) => {
                let mut tmp = itoa::Buffer::new();
                tmp.format(*n).to_string()
            }
            Value::Float(x) => float_text(*x),
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// Integral coercion.
    ///
    /// Integers pass through, finite in-range floats truncate, strings parse
    /// as decimal. Everything else lacks the capability.
    pub fn to_int(&self) -> Result<i64, EncodeError> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(x) => {
                if !x.is_finite() {
                    return Err(EncodeError::coerce("integer", "non-finite float"));
                }
                let t = x.trunc();
                // i64::MIN is exact in f64; its negation is 2^63, one past MAX.
                if t < i64::MIN as f64 || t >= -(i64::MIN as f64) {
                    return Err(EncodeError::coerce("integer", "out-of-range float"));
                }
                Ok(t as i64)
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| EncodeError::coerce("integer", "string")),
            other => Err(EncodeError::coerce("integer", other.kind())),
        }
    }

    /// Floating-point coercion. Only numeric shapes qualify.
    pub fn to_float(&self) -> Result<f64, EncodeError> {
        match self {
            Value::Float(x) => Ok(*x),
            Value::Int(n) => Ok(*n as f64),
            other => Err(EncodeError::coerce("float", other.kind())),
        }
    }
}

fn float_text(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    let mut tmp = ryu::Buffer::new();
    tmp.format_finite(x).to_string()
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text_scalars() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Int(-42).to_text(), "-42");
        assert_eq!(Value::Float(3.25).to_text(), "3.25");
        assert_eq!(Value::from("abc").to_text(), "abc");
    }

    #[test]
    fn test_to_text_non_finite_floats() {
        assert_eq!(Value::Float(f64::INFINITY).to_text(), "Infinity");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_text(), "-Infinity");
        assert_eq!(Value::Float(f64::NAN).to_text(), "NaN");
    }

    #[test]
    fn test_to_int_coercions() {
        assert_eq!(Value::Int(7).to_int().unwrap(), 7);
        assert_eq!(Value::Float(7.9).to_int().unwrap(), 7);
        assert_eq!(Value::Float(-7.9).to_int().unwrap(), -7);
        assert_eq!(Value::from(" 42 ").to_int().unwrap(), 42);
        assert!(Value::from("4x").to_int().is_err());
        assert!(Value::Bool(true).to_int().is_err());
        assert!(Value::Float(f64::NAN).to_int().is_err());
        assert!(Value::Float(1e20).to_int().is_err());
    }

    #[test]
    fn test_to_float_coercions() {
        assert_eq!(Value::Float(1.5).to_float().unwrap(), 1.5);
        assert_eq!(Value::Int(3).to_float().unwrap(), 3.0);
        assert!(Value::from("1.5").to_float().is_err());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }
}
