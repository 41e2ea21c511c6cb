//! JavaScript emitter.
//!
//! Generated code targets the browser `suit` runtime: `suit.SuitRunTime`,
//! `suit.SuitFilters` and `String.prototype.format` with `{N}` placeholders.

use super::Syntax;
use std::fmt::Write;
use suit_parser::PathSegment;
use suit_runtime::Filter;

/// Emits JavaScript source expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScript;

impl Syntax for JavaScript {
    type Output = String;

    fn literal(&self, pieces: &[String], children: Vec<String>) -> String {
        if children.is_empty() {
            return format!("\"{}\"", escape(&pieces.concat()));
        }

        // A literal `{N}` would be read as a placeholder, so its `{` is
        // passed as one extra argument.
        let brace = children.len();
        let mut needs_brace = false;
        let mut template = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            let escaped = escape(piece);
            let (guarded, replaced) = guard_placeholders(&escaped, brace);
            needs_brace |= replaced;
            template.push_str(&guarded);
            if i < children.len() {
                let _ = write!(template, "{{{i}}}");
            }
        }

        let mut arguments = children;
        if needs_brace {
            arguments.push("\"{\"".to_string());
        }
        format!("\"{template}\".format({})", arguments.join(", "))
    }

    fn var(&self, path: &[PathSegment], default: Option<String>) -> String {
        format!(
            "suit.SuitRunTime.var(function(){{ return data{}; }}, {})",
            subscripts(path),
            default.as_deref().unwrap_or("null")
        )
    }

    fn filter(&self, filter: Filter, input: String, argument: Option<String>) -> String {
        let argument = argument.unwrap_or_else(|| "null".to_string());
        match filter {
            Filter::Length => format!("suit.SuitFilters.length({input})"),
            Filter::In => format!("suit.SuitFilters.inArray({input}, {argument})"),
            Filter::NotIn => format!("!suit.SuitFilters.inArray({input}, {argument})"),
            Filter::Bool | Filter::Int | Filter::Str => {
                format!("suit.SuitFilters.{filter}({input})")
            }
            Filter::StartsWith | Filter::Contains | Filter::DateFormat => {
                format!("suit.SuitFilters.{filter}({input}, {argument})")
            }
        }
    }

    fn stringify(&self, value: String) -> String {
        format!("suit.SuitRunTime.stringify({value})")
    }

    fn json(&self, value: String) -> String {
        format!("JSON.stringify({value})")
    }

    fn loop_key(&self, name: &str, modifier: Option<&str>) -> String {
        match modifier {
            Some(modifier) => format!("({name}{modifier})"),
            None => name.to_string(),
        }
    }

    fn condition(&self, condition: String, on_true: String, on_false: String) -> String {
        format!(
            "suit.SuitRunTime.opt({condition}, function() {{return ({on_true})}}, function() {{return ({on_false})}})"
        )
    }

    fn list(&self, body: String, bound: &str, iterable: String) -> String {
        format!("suit.SuitRunTime.list(function({bound}) {{ return {body}; }}, ({iterable}))")
    }

    fn expression(&self, inner: String) -> String {
        format!("suit.SuitRunTime.expression({inner})")
    }

    fn scope(&self, overlay: String, body: String) -> String {
        format!("suit.SuitRunTime.scope(data, {overlay}, function(data) {{ return {body}; }})")
    }
}

/// Wraps a compiled expression into a registration call for `registry_name`.
///
/// `script` is the template's extracted `<script>` text; it becomes the init
/// callback.
pub fn javascript_unit(registry_name: &str, compiled: &str, script: Option<&str>) -> String {
    let init = match script.map(str::trim).filter(|script| !script.is_empty()) {
        Some(script) => format!("function() {{\n    return {script}()\n}}"),
        None => "null".to_string(),
    };
    format!(
        "suit.SuitApi.addTemplate(\"{}\", function(data) {{\n    if (data == null) {{ data = {{}}; }};\n    return {compiled}\n}}, {init});\n",
        escape(registry_name)
    )
}

/// Replaces the `{` of every `{digits}` with `{brace}`.
fn guard_placeholders(text: &str, brace: usize) -> (String, bool) {
    let mut out = String::with_capacity(text.len());
    let mut replaced = false;
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && after[digits..].starts_with('}') {
            let _ = write!(out, "{{{brace}}}");
            replaced = true;
        } else {
            out.push('{');
        }
        rest = after;
    }
    out.push_str(rest);
    (out, replaced)
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
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_placeholders() {
        let js = JavaScript;
        assert_eq!(
            js.literal(&["<p>".into(), "</p>".into()], vec!["x".into()]),
            r#""<p>{0}</p>".format(x)"#
        );
        assert_eq!(js.literal(&["{0}".into()], Vec::new()), r#""{0}""#);
    }

    #[test]
    fn test_literal_braces_are_guarded() {
        let js = JavaScript;
        assert_eq!(
            js.literal(&["{1} ".into(), " {x}".into()], vec!["v".into()]),
            r#""{1}1} {0} {x}".format(v, "{")"#
        );
    }

    #[test]
    fn test_unit_without_script() {
        let unit = javascript_unit("pages.home", "\"x\"", None);
        assert_eq!(
            unit,
            "suit.SuitApi.addTemplate(\"pages.home\", function(data) {\n    if (data == null) { data = {}; };\n    return \"x\"\n}, null);\n"
        );
    }
}
