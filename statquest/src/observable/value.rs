//! Cell values and row keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

static INTEGER_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d+$").expect("integer literal pattern is valid")
});

static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("float literal pattern is valid")
});

/// A single observed value.
///
/// Values arrive from loaders in whatever form the source produced them; the
/// scale of an [`Observable`](super::Observable) is decided by which casts
/// succeed for every value, not by the variant alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Whole number
    Int(i64),
    /// Real number
    Float(f64),
    /// Anything else, including numeric text
    Text(String),
}

impl Value {
    /// Casts to an integer if the value survives the round trip unchanged.
    ///
    /// ```rust
    /// use statquest::observable::Value;
    ///
    /// assert_eq!(Value::from(3).as_integer(), Some(3));
    /// assert_eq!(Value::from("3").as_integer(), Some(3));
    /// assert_eq!(Value::from(3.0).as_integer(), Some(3));
    /// assert_eq!(Value::from(3.5).as_integer(), None);
    /// assert_eq!(Value::from("3.5").as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => float_to_integer(*f),
            Value::Text(s) => {
                let trimmed = s.trim();
                if INTEGER_LITERAL.is_match(trimmed) {
                    trimmed.parse().ok()
                } else {
                    None
                }
            }
        }
    }

    /// Casts to a float if the value is a real number.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => Some(*f),
            Value::Text(s) => {
                let trimmed = s.trim();
                if FLOAT_LITERAL.is_match(trimmed) {
                    trimmed.parse().ok()
                } else {
                    None
                }
            }
        }
    }

    /// Returns true for a float NaN, the marker of a missing cell.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                float_to_integer(*b) == Some(*a)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => match float_to_integer(*f) {
                Some(i) => {
                    0u8.hash(state);
                    i.hash(state);
                }
                None => {
                    1u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Value::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl PartialOrd for Value {
    /// Numbers compare numerically, texts lexicographically; a number and a
    /// text are not comparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_float()?, b.as_float()?);
                x.partial_cmp(&y)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part of whole floats ("1.0")
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Identity of a row, shared by every observable read from the same table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Row number or numeric primary key
    Index(i64),
    /// Textual primary key
    Label(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Index(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Index(value.into())
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Index(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Label(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Label(value)
    }
}
