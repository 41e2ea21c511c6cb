//! Variable filters.

use crate::error::RuntimeError;
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Write};

/// A filter applied to a variable's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Character count of strings, entry count of collections, digit count of integers.
    Length,
    /// Whether the value starts with the argument.
    StartsWith,
    /// Whether the value occurs in the argument.
    In,
    /// Negation of [`Filter::In`]; also false when either side is absent.
    NotIn,
    /// Whether the argument occurs in the value.
    Contains,
    /// Truthiness where `"false"`, `"none"`, `"0"` and `""` are false.
    Bool,
    Int,
    /// The stringified value wrapped in double quotes.
    Str,
    /// strftime-style date formatting.
    DateFormat,
}

impl Filter {
    pub const ALL: [Filter; 9] = [
        Filter::Length,
        Filter::StartsWith,
        Filter::In,
        Filter::NotIn,
        Filter::Contains,
        Filter::Bool,
        Filter::Int,
        Filter::Str,
        Filter::DateFormat,
    ];

    /// Returns the attribute spelling of this filter.
    pub fn name(self) -> &'static str {
        match self {
            Filter::Length => "length",
            Filter::StartsWith => "startswith",
            Filter::In => "in",
            Filter::NotIn => "notin",
            Filter::Contains => "contains",
            Filter::Bool => "bool",
            Filter::Int => "int",
            Filter::Str => "str",
            Filter::DateFormat => "dateformat",
        }
    }

    /// Looks up a filter by its attribute spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.name() == name)
    }

    /// Returns true if the filter reads a `<name>-data` argument.
    pub fn takes_argument(self) -> bool {
        matches!(
            self,
            Filter::StartsWith | Filter::In | Filter::NotIn | Filter::Contains | Filter::DateFormat
        )
    }

    /// Applies the filter.
    pub fn apply(self, input: Value, argument: Option<Value>) -> Result<Value, RuntimeError> {
        let required = || {
            argument
                .clone()
                .ok_or_else(|| RuntimeError::filter(self.name(), "missing argument"))
        };

        match self {
            Filter::Length => length(&input).map(Value::from),
            Filter::StartsWith => {
                let prefix = required()?;
                Ok(Value::Bool(
                    !input.is_absent()
                        && !prefix.is_absent()
                        && input.stringify().starts_with(&prefix.stringify()),
                ))
            }
            Filter::In => Ok(Value::Bool(member(&input, &required()?))),
            Filter::NotIn => {
                let haystack = required()?;
                if input.is_absent() || haystack.is_absent() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(!member(&input, &haystack)))
            }
            Filter::Contains => Ok(Value::Bool(member(&required()?, &input))),
            Filter::Bool => Ok(Value::Bool(to_bool(&input))),
            Filter::Int => to_int(&input).map(Value::Int),
            Filter::Str => Ok(Value::Str(format!("\"{}\"", input.stringify()))),
            Filter::DateFormat => {
                if input.is_absent() {
                    return Ok(Value::Str(String::new()));
                }
                let format = required()?.stringify();
                date_format(&input, &format).map(Value::Str)
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn length(value: &Value) -> Result<usize, RuntimeError> {
    match value {
        Value::Absent | Value::Null => Ok(0),
        Value::Int(_) | Value::Bool(_) => Ok(value.stringify().len()),
        _ => value.len().ok_or_else(|| {
            RuntimeError::filter("length", format!("{} has no length", value.type_name()))
        }),
    }
}

/// Membership of `needle` in `haystack`. A string haystack holding a JSON
/// array or object is matched structurally, any other string by substring.
fn member(needle: &Value, haystack: &Value) -> bool {
    if needle.is_absent() || haystack.is_absent() {
        return false;
    }

    match haystack {
        Value::Str(text) => match structured(text) {
            Some(parsed) => member(needle, &parsed),
            None => text.contains(&needle.stringify()),
        },
        Value::List(items) => {
            let needle_text = needle.stringify();
            items
                .iter()
                .any(|item| item.loose_eq(needle) || item.stringify() == needle_text)
        }
        Value::Map(entries) => entries.contains_key(&needle.stringify()),
        _ => false,
    }
}

fn structured(text: &str) -> Option<Value> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .map(Value::from)
}

fn to_bool(value: &Value) -> bool {
    if value.is_absent() {
        return false;
    }
    let text = value.stringify().to_lowercase();
    if matches!(text.as_str(), "false" | "none" | "null" | "" | "0") {
        return false;
    }
    value.is_truthy()
}

fn to_int(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Absent => Ok(0),
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| RuntimeError::filter("int", format!("invalid integer `{s}`"))),
        other => Err(RuntimeError::filter(
            "int",
            format!("cannot convert {} to an integer", other.type_name()),
        )),
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%a %b %e %H:%M:%S %Y",
];

fn parse_date(value: &Value) -> Option<DateTime<FixedOffset>> {
    let text = match value {
        Value::Int(timestamp) => {
            return DateTime::from_timestamp(*timestamp, 0).map(|dt| dt.fixed_offset());
        }
        Value::Str(text) => text.trim(),
        _ => return None,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            let time = NaiveTime::parse_from_str(text, "%H:%M:%S").ok()?;
            NaiveDate::from_ymd_opt(1970, 1, 1).map(|date| date.and_time(time))
        })?;
    Some(naive.and_utc().fixed_offset())
}

fn date_format(value: &Value, format: &str) -> Result<String, RuntimeError> {
    let date = parse_date(value).ok_or_else(|| {
        RuntimeError::filter(
            "dateformat",
            format!("`{}` is not a date", value.stringify()),
        )
    })?;

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(RuntimeError::filter(
            "dateformat",
            format!("invalid format `{format}`"),
        ));
    }

    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter())).map_err(|_| {
        RuntimeError::filter("dateformat", format!("cannot format with `{format}`"))
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn apply(filter: Filter, input: impl Into<Value>, argument: Option<&str>) -> Value {
        filter
            .apply(input.into(), argument.map(Value::from))
            .unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for filter in Filter::ALL {
            assert_eq!(Filter::from_name(filter.name()), Some(filter));
        }
        assert_eq!(Filter::from_name("upper"), None);
    }

    #[test]
    fn test_length() {
        assert_eq!(apply(Filter::Length, Value::Absent, None).as_i64(), Some(0));
        assert_eq!(apply(Filter::Length, "abcd", None).as_i64(), Some(4));
        assert_eq!(apply(Filter::Length, 12345_i64, None).as_i64(), Some(5));
        let list = Value::from(json!([1, 2, 3]));
        assert_eq!(apply(Filter::Length, list, None).as_i64(), Some(3));
        assert!(Filter::Length.apply(Value::Float(1.5), None).is_err());
    }

    #[test]
    fn test_membership() {
        assert!(apply(Filter::In, "b", Some("abc")).is_truthy());
        assert!(apply(Filter::In, 2_i64, Some("[1, 2, 3]")).is_truthy());
        assert!(!apply(Filter::In, 4_i64, Some("[1, 2, 3]")).is_truthy());
        assert!(apply(Filter::In, "k", Some(r#"{"k": 1}"#)).is_truthy());
        assert!(apply(Filter::NotIn, "z", Some("abc")).is_truthy());
        assert!(!apply(Filter::NotIn, Value::Absent, Some("abc")).is_truthy());
        assert!(!apply(Filter::In, Value::Absent, Some("abc")).is_truthy());

        let list = Value::from(json!([1, 2, 3]));
        assert!(apply(Filter::Contains, list.clone(), Some("3")).is_truthy());
        assert!(!apply(Filter::Contains, list, Some("5")).is_truthy());
    }

    #[test]
    fn test_startswith() {
        assert!(apply(Filter::StartsWith, "/admin/users", Some("/admin")).is_truthy());
        assert!(!apply(Filter::StartsWith, Value::Absent, Some("")).is_truthy());
        assert!(Filter::StartsWith.apply(Value::from("x"), None).is_err());
    }

    #[test]
    fn test_bool() {
        for falsy in ["false", "False", "None", "0", ""] {
            assert!(!apply(Filter::Bool, falsy, None).is_truthy(), "{falsy:?}");
        }
        assert!(apply(Filter::Bool, "yes", None).is_truthy());
        assert!(!apply(Filter::Bool, Value::Absent, None).is_truthy());
        assert!(!apply(Filter::Bool, 0_i64, None).is_truthy());
    }

    #[test]
    fn test_int_and_str() {
        assert_eq!(apply(Filter::Int, " 42 ", None).as_i64(), Some(42));
        assert_eq!(apply(Filter::Int, Value::Absent, None).as_i64(), Some(0));
        assert_eq!(apply(Filter::Int, 2.9_f64, None).as_i64(), Some(2));
        assert!(Filter::Int.apply(Value::from("x"), None).is_err());
        assert_eq!(apply(Filter::Str, 5_i64, None).stringify(), "\"5\"");
    }

    #[test]
    fn test_dateformat() {
        let format = Some("%d.%m.%Y %H:%M");
        assert_eq!(
            apply(Filter::DateFormat, "2021-03-04 05:06:07", format).stringify(),
            "04.03.2021 05:06"
        );
        assert_eq!(
            apply(Filter::DateFormat, "2021-03-04T05:06:07+02:00", format).stringify(),
            "04.03.2021 05:06"
        );
        assert_eq!(
            apply(Filter::DateFormat, "2021-03-04", Some("%Y/%m/%d")).stringify(),
            "2021/03/04"
        );
        assert_eq!(
            apply(Filter::DateFormat, 0_i64, Some("%Y")).stringify(),
            "1970"
        );
        assert_eq!(
            apply(Filter::DateFormat, Value::Absent, Some("%Y")).stringify(),
            ""
        );
        assert!(Filter::DateFormat
            .apply(Value::from("yesterday"), Some(Value::from("%Y")))
            .is_err());
    }
}
