//! Python emitter.
//!
//! Generated code targets the `suit.Suit` runtime module: `SuitRunTime` for
//! access, dispatch and iteration, `SuitFilters` for filters.

use super::Syntax;
use std::fmt::Write;
use suit_parser::PathSegment;
use suit_runtime::Filter;

/// Emits Python source expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

impl Syntax for Python {
    type Output = String;

    fn literal(&self, pieces: &[String], children: Vec<String>) -> String {
        if children.is_empty() {
            return format!("\"{}\"", escape(&pieces.concat()));
        }

        let mut template = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            template.push_str(&escape(piece).replace('%', "%%"));
            if i < children.len() {
                template.push_str("%s");
            }
        }
        format!("\"{template}\" % ({},)", children.join(", "))
    }

    fn var(&self, path: &[PathSegment], default: Option<String>) -> String {
        format!(
            "SuitRunTime.var(lambda self: self.data{}, {}, self)",
            subscripts(path),
            default.as_deref().unwrap_or("None")
        )
    }

    fn filter(&self, filter: Filter, input: String, argument: Option<String>) -> String {
        match argument {
            Some(argument) => format!("SuitFilters._{filter}({input}, {argument})"),
            None => format!("SuitFilters._{filter}({input})"),
        }
    }

    fn stringify(&self, value: String) -> String {
        format!("SuitRunTime.stringify({value})")
    }

    fn json(&self, value: String) -> String {
        format!("SuitRunTime.json({value})")
    }

    fn loop_key(&self, name: &str, modifier: Option<&str>) -> String {
        format!("{name}{}", modifier.unwrap_or_default())
    }

    fn condition(&self, condition: String, on_true: String, on_false: String) -> String {
        format!("SuitRunTime.opt({condition}, lambda: {on_true}, lambda: {on_false})")
    }

    fn list(&self, body: String, bound: &str, iterable: String) -> String {
        format!("SuitRunTime.list(lambda {bound}: {body}, {iterable})")
    }

    fn expression(&self, inner: String) -> String {
        format!("SuitRunTime.expression({inner})")
    }

    fn scope(&self, overlay: String, body: String) -> String {
        format!("SuitRunTime.scope(self, {overlay}, lambda self: {body})")
    }

    fn logic_and(&self) -> &'static str {
        "and"
    }

    fn logic_or(&self) -> &'static str {
        "or"
    }

    fn logic_not(&self) -> &'static str {
        "not"
    }

    fn true_literal(&self) -> &'static str {
        "True"
    }

    fn false_literal(&self) -> &'static str {
        "False"
    }
}

/// Wraps a compiled expression into the module for unit `class_name`.
pub fn python_unit(class_name: &str, compiled: &str) -> String {
    format!(
        "from suit.Suit import Suit, SuitRunTime, SuitNone, SuitFilters\n\
         class {class_name}(object):\n\
         \tdef execute(self, data={{}}):\n\
         \t\tself.data = data\n\
         \t\treturn ({compiled})\n"
    )
}

fn subscripts(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        let _ = match segment {
            PathSegment::Field(name) => write!(out, "[\"{}\"]", escape(name)),
            PathSegment::Index(raw) => write!(out, "[{raw}]"),
        };
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
