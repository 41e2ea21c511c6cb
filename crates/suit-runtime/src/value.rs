//! Template data values.

use crate::error::RuntimeError;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// The text an absent value renders as.
pub const ABSENT_MARKER: &str = "SuitNone()";

/// A value seen by a template.
///
/// `Absent` is the result of a failed lookup. It renders as [`ABSENT_MARKER`],
/// is never equal to anything (itself included), has length zero, iterates as
/// empty and orders like the number `0`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Absent,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns true for the absent sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns a short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Python-like truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Absent | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// Returns the length of strings and collections; absent has length zero.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Absent => Some(0),
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Returns true if [`Value::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Returns the numeric value of numbers and booleans.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the integer value of integers and booleans.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Renders the value as template output.
    ///
    /// Strings are raw, collections are compact JSON.
    pub fn stringify(&self) -> String {
        match self {
            Value::Absent => ABSENT_MARKER.to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => float_text(*f),
            Value::Str(s) => s.clone(),
            Value::List(_) | Value::Map(_) => self.to_json().to_string(),
        }
    }

    /// Converts to JSON. Absent becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Absent | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Loose equality: absent equals nothing, booleans compare as numbers,
    /// strings never equal numbers.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Absent, _) | (_, Value::Absent) => false,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.loose_eq(y)))
            }
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Orders two values. Absent orders like `0`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        let zero = Value::Int(0);
        let left = if self.is_absent() { &zero } else { self };
        let right = if other.is_absent() { &zero } else { other };

        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        unequal => return Ok(unequal),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| {
                    RuntimeError::type_error("cannot order NaN")
                }),
                _ => Err(RuntimeError::type_error(format!(
                    "cannot order {} and {}",
                    left.type_name(),
                    right.type_name()
                ))),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.loose_eq(other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent | Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Shortest round-trip text for a float; whole numbers keep their `.0`.
fn float_text(f: f64) -> String {
    match serde_json::Number::from_f64(f) {
        Some(number) => number.to_string(),
        None if f.is_nan() => "nan".to_string(),
        None if f > 0.0 => "inf".to_string(),
        None => "-inf".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_absent_equality() {
        let (a, b) = (Value::Absent, Value::Absent);
        assert!(a != b);
        assert!(a != Value::Int(0));
        assert!(!Value::Absent.loose_eq(&Value::Null));
    }

    #[test]
    fn test_absent_orders_like_zero() {
        let absent = Value::Absent;
        assert!(absent > Value::Int(-1));
        assert!(absent < Value::Int(1));
        assert!(absent >= Value::Int(0));
        assert!(absent <= Value::Int(0));
        assert!(!(absent > Value::Int(1)));
        assert!(!(absent < Value::Int(-1)));
    }

    #[test]
    fn test_bool_compares_numerically() {
        assert!(Value::Bool(true).loose_eq(&Value::Int(1)));
        assert!(Value::Bool(false).loose_eq(&Value::Float(0.0)));
        assert!(!Value::Str("1".into()).loose_eq(&Value::Int(1)));
    }

    #[test]
    fn test_string_number_ordering_is_an_error() {
        assert!(Value::Str("a".into()).compare(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_stringify() {
        assert_eq!(Value::Absent.stringify(), "SuitNone()");
        assert_eq!(Value::Bool(true).stringify(), "true");
        assert_eq!(Value::Int(-3).stringify(), "-3");
        assert_eq!(Value::Float(2.5).stringify(), "2.5");
        assert_eq!(Value::Float(2.0).stringify(), "2.0");
        assert_eq!(Value::Float(-0.5).stringify(), "-0.5");
        assert_eq!(Value::Float(f64::INFINITY).stringify(), "inf");
        assert_eq!(Value::Str("x".into()).stringify(), "x");
        let list = Value::from(json!([1, "a", {"b": null}]));
        assert_eq!(list.stringify(), r#"[1,"a",{"b":null}]"#);
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2}));
        let Value::Map(entries) = value else {
            panic!("expected map");
        };
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_len() {
        assert_eq!(Value::Absent.len(), Some(0));
        assert_eq!(Value::Str("héllo".into()).len(), Some(5));
        assert_eq!(Value::Int(5).len(), None);
    }
}
