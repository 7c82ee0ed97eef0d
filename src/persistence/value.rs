use std::cmp::Ordering;
use std::fmt::Display;

use bigdecimal::{BigDecimal, ToPrimitive};

/// A single cell of a [`super::Row`].
///
/// The variants are the storage shapes, not the column types: a URL column
/// holds [`Value::Text`] and the schema decides whether the text is a valid
/// URL. Equality is exact and does not cross variants, so `Integer(1)` is
/// not equal to `Float(1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Decimal(BigDecimal),
}

/// Hashable form of a non-null [`Value`], used to track primary keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyValue {
    Integer(i64),
    Float(u64),
    Text(String),
    Decimal(BigDecimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
            Value::Decimal(_) => "DECIMAL",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        //! Render the value the way it is written to a snapshot.
        //!
        //! Decimals become strings so that no precision is lost to a binary
        //! float on the way through JSON.

        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        }
    }

    pub(crate) fn key(&self) -> Option<KeyValue> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(KeyValue::Integer(*i)),
            // -0.0 and 0.0 compare equal, so they must hash equal too
            Value::Float(f) if *f == 0.0 => Some(KeyValue::Float(0.0f64.to_bits())),
            Value::Float(f) => Some(KeyValue::Float(f.to_bits())),
            Value::Text(s) => Some(KeyValue::Text(s.clone())),
            Value::Decimal(d) => Some(KeyValue::Decimal(d.normalized())),
        }
    }

    pub(crate) fn compare(&self, other: &Value) -> Ordering {
        //! Total order used for sorting: nulls first, then numbers, then text.

        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Integer(a), Value::Decimal(b)) => BigDecimal::from(*a).cmp(b),
            (Value::Decimal(a), Value::Integer(b)) => a.cmp(&BigDecimal::from(*b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Float(_) | Value::Decimal(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NIL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
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

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Decimal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
