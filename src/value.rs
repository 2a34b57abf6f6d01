//! Observed values.

use std::fmt;

/// The value of one observation or attribute.
///
/// Station metadata mixes integer, real and text values in the same export, so cubes hold this
/// type rather than a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An integer value.
    Int(i64),
    /// A real value.
    Real(f64),
    /// A text value.
    Text(String),
}

impl Value {
    /// Numeric interpretation of the value, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(val) => Some(val as f64),
            Value::Real(val) => Some(val),
            Value::Text(_) => None,
        }
    }

    /// Whether two values are the same observation. Unlike `==`, a NaN matches itself.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Real(a), Value::Real(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => self == other,
        }
    }

    /// The text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(val) => Some(val),
            _ => None,
        }
    }
}

// Fill for cells no record wrote to. Only ever read through the mask.
impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(val) => write!(f, "{}", val),
            Value::Real(val) => write!(f, "{}", val),
            Value::Text(val) => write!(f, "{:?}", val),
        }
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Int(i64::from(val))
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Real(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_owned())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::from(12).as_f64(), Some(12.0));
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("Test").as_f64(), None);
        assert_eq!(Value::from("Test").as_str(), Some("Test"));
    }

    #[test]
    fn test_int_and_real_are_different_values() {
        assert_ne!(Value::Int(1), Value::Real(1.0));
        assert!(!Value::Int(1).same_as(&Value::Real(1.0)));
    }

    #[test]
    fn test_nan_is_the_same_as_nan() {
        assert!(Value::Real(f64::NAN).same_as(&Value::Real(f64::NAN)));
        assert!(Value::Real(273.15).same_as(&Value::Real(273.15)));
        assert!(!Value::Real(f64::NAN).same_as(&Value::Real(0.0)));
        assert!(Value::from("Test").same_as(&Value::from("Test")));
    }
}
