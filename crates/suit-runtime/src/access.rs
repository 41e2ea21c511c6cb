//! Safe data access.

use crate::expr;
use crate::scope::Locals;
use crate::value::Value;
use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;

/// One step of a data access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// A mapping key.
    Field(SmolStr),
    /// Raw bracket contents, evaluated as an expression against loop bindings.
    Index(String),
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Field(name) => write!(f, ".{name}"),
            Access::Index(raw) => write!(f, "[{raw}]"),
        }
    }
}

/// Follows `path` from `root`.
///
/// Returns `None` when any step is missing or has the wrong shape, or when the
/// path ends on `null`. Never fails.
pub fn lookup(root: &Value, path: &[Access], locals: &Locals) -> Option<Value> {
    let mut current = Cow::Borrowed(root);

    for step in path {
        current = match step {
            Access::Field(name) => field(current, name)?,
            Access::Index(raw) => {
                let key = expr::evaluate(raw, locals).ok()?;
                index(current, &key)?
            }
        };
    }

    match current.into_owned() {
        Value::Null | Value::Absent => None,
        value => Some(value),
    }
}

fn field<'a>(current: Cow<'a, Value>, name: &str) -> Option<Cow<'a, Value>> {
    match current {
        Cow::Borrowed(Value::Map(entries)) => entries.get(name).map(Cow::Borrowed),
        Cow::Owned(Value::Map(mut entries)) => entries.swap_remove(name).map(Cow::Owned),
        _ => None,
    }
}

fn index<'a>(current: Cow<'a, Value>, key: &Value) -> Option<Cow<'a, Value>> {
    match key {
        Value::Str(name) => field(current, name),
        Value::Int(n) => match current.as_ref() {
            Value::Map(_) => field(current, &n.to_string()),
            Value::List(_) => element(current, usize::try_from(*n).ok()?),
            Value::Str(s) => usize::try_from(*n)
                .ok()
                .and_then(|n| s.chars().nth(n))
                .map(|c| Cow::Owned(Value::Str(c.to_string()))),
            _ => None,
        },
        _ => None,
    }
}

fn element(current: Cow<'_, Value>, n: usize) -> Option<Cow<'_, Value>> {
    match current {
        Cow::Borrowed(Value::List(items)) => items.get(n).map(Cow::Borrowed),
        Cow::Owned(Value::List(mut items)) if n < items.len() => {
            Some(Cow::Owned(items.swap_remove(n)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(steps: &[&str]) -> Vec<Access> {
        steps
            .iter()
            .map(|step| match step.strip_prefix('[') {
                Some(raw) => Access::Index(raw.trim_end_matches(']').to_string()),
                None => Access::Field(SmolStr::new(step)),
            })
            .collect()
    }

    fn data() -> Value {
        Value::from(json!({
            "a": {"b": {"c": "deep"}},
            "items": ["x", "y", "z"],
            "counts": {"0": "zero", "k": "kay"},
            "empty": null,
            "word": "héllo"
        }))
    }

    #[test]
    fn test_field_path() {
        let value = lookup(&data(), &path(&["a", "b", "c"]), &Locals::new());
        assert_eq!(value.map(|v| v.stringify()), Some("deep".to_string()));
    }

    #[test]
    fn test_missing_step() {
        let locals = Locals::new();
        assert!(lookup(&data(), &path(&["a", "x", "c"]), &locals).is_none());
        assert!(lookup(&data(), &path(&["items", "b"]), &locals).is_none());
        assert!(lookup(&data(), &path(&["empty"]), &locals).is_none());
    }

    #[test]
    fn test_index_by_literal_and_local() {
        let locals: Locals = [("i", Value::Int(2))].into_iter().collect();
        let value = |steps: &[&str]| lookup(&data(), &path(steps), &locals).map(|v| v.stringify());
        assert_eq!(value(&["items", "[0]"]), Some("x".to_string()));
        assert_eq!(value(&["items", "[i]"]), Some("z".to_string()));
        assert_eq!(value(&["items", "[i + 1]"]), None);
        assert_eq!(value(&["items", "[-1]"]), None);
        assert_eq!(value(&["counts", "['k']"]), Some("kay".to_string()));
        assert_eq!(value(&["counts", "[0]"]), Some("zero".to_string()));
        assert_eq!(value(&["word", "[1]"]), Some("é".to_string()));
    }

    #[test]
    fn test_unbound_index_is_missing() {
        assert!(lookup(&data(), &path(&["items", "[nope]"]), &Locals::new()).is_none());
    }
}
