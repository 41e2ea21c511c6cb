//! Template Part extraction and tag construction.

use crate::ast::{
    Breakpoint, Condition, Expression, FilterCall, IterationKey, List, Tag, TagKind, TemplatePart,
    Variable,
};
use crate::counter::{count, decount, extract};
use crate::error::ParseError;
use crate::markup::{normalize_whitespace, Markup};
use crate::path::{parse_path, PathSegment};
use crate::rewrite::{rewrite_list_body, LoopBinding};
use smol_str::SmolStr;
use suit_span::Span;

impl TemplatePart {
    /// Parses top-level template text. Whitespace is normalized first.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_fragment(&normalize_whitespace(text))
    }

    /// Parses text that has already been normalized, such as a tag body.
    pub fn parse_fragment(text: &str) -> Result<Self, ParseError> {
        let counted = count(text)?;
        let mut pieces = Vec::new();
        let mut children = Vec::new();
        let mut cursor = 0;

        for range in extract(&counted) {
            pieces.push(decount(&counted[cursor..range.start]));
            let tag_text = decount(&counted[range.clone()]);
            let span = Span::from_range(range.clone());
            children.push(Tag::parse(&tag_text, span)?);
            cursor = range.end;
        }
        pieces.push(decount(&counted[cursor..]));

        Ok(Self {
            text: text.to_string(),
            pieces,
            children,
        })
    }
}

impl Tag {
    /// Builds a typed tag from its full text.
    ///
    /// `span` locates the tag in the counted text of its parent and is used for errors.
    pub fn parse(text: &str, span: Span) -> Result<Self, ParseError> {
        let markup = Markup::parse(text);
        let kind = match markup.name {
            "var" => TagKind::Var(variable(&markup)?),
            "iterationvar" => TagKind::IterationVar(iteration_variable(&markup, span)?),
            "iterationkey" => TagKind::IterationKey(iteration_key(&markup, span)?),
            "if" => TagKind::Condition(condition(&markup)?),
            "list" => TagKind::List(list(&markup, span)?),
            "expression" => TagKind::Expression(Expression {
                body: TemplatePart::parse_fragment(markup.body)?,
            }),
            "breakpoint" => TagKind::Breakpoint(breakpoint(&markup)?),
            _ => TagKind::Generic,
        };

        Ok(Self {
            name: SmolStr::new(markup.name),
            attributes: markup.attributes.clone(),
            raw_body: markup.body.to_string(),
            text: text.to_string(),
            span,
            kind,
        })
    }
}

fn variable(markup: &Markup<'_>) -> Result<Variable, ParseError> {
    Ok(Variable {
        path: parse_path(markup.body),
        default: optional_part(markup.attribute("d"))?,
        filters: filters(markup)?,
    })
}

fn filters(markup: &Markup<'_>) -> Result<Vec<FilterCall>, ParseError> {
    let Some(names) = markup.attribute("filter") else {
        return Ok(Vec::new());
    };

    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "None")
        .map(|name| {
            Ok(FilterCall {
                name: SmolStr::new(name),
                argument: optional_part(markup.attribute(&format!("{name}-data")))?,
            })
        })
        .collect()
}

fn iteration_variable(markup: &Markup<'_>, span: Span) -> Result<Variable, ParseError> {
    let iterable = markup
        .attribute("in")
        .ok_or_else(|| ParseError::unsupported("iterationvar", "missing `in` attribute", span))?;
    let name = markup
        .attribute("name")
        .ok_or_else(|| ParseError::unsupported("iterationvar", "missing `name` attribute", span))?;

    let mut path = parse_path(iterable);
    path.push(PathSegment::Index(name.trim().to_string()));
    path.extend(parse_path(markup.attribute("path").unwrap_or_default()));

    Ok(Variable {
        path,
        default: None,
        filters: filters(markup)?,
    })
}

fn iteration_key(markup: &Markup<'_>, span: Span) -> Result<IterationKey, ParseError> {
    let name = markup
        .attribute("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::unsupported("iterationkey", "missing `name` attribute", span))?;

    Ok(IterationKey {
        name: SmolStr::new(name),
        modifier: markup
            .attribute("mod")
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
    })
}

fn condition(markup: &Markup<'_>) -> Result<Condition, ParseError> {
    let body = TemplatePart::parse_fragment(markup.body)?;
    let mut condition = optional_part(markup.attribute("condition"))?;
    let mut on_true = None;
    let mut on_false = None;

    for child in body.children() {
        match child.name.as_str() {
            "condition" => condition = Some(TemplatePart::parse_fragment(&child.raw_body)?),
            "true" => on_true = Some(TemplatePart::parse_fragment(&child.raw_body)?),
            "false" => on_false = Some(TemplatePart::parse_fragment(&child.raw_body)?),
            _ => {}
        }
    }

    let on_true = on_true.unwrap_or_else(|| {
        body.without(|tag| matches!(tag.name.as_str(), "condition" | "true" | "false"))
    });

    Ok(Condition {
        condition: condition.unwrap_or_default(),
        on_true,
        on_false: on_false.unwrap_or_default(),
    })
}

fn list(markup: &Markup<'_>, span: Span) -> Result<List, ParseError> {
    let bound = markup
        .attribute("for")
        .ok_or_else(|| ParseError::unsupported("list", "missing `for` attribute", span))?;
    let iterable = markup
        .attribute("in")
        .ok_or_else(|| ParseError::unsupported("list", "missing `in` attribute", span))?;

    let (key_var, value_var) = match bound.split_once(',') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (bound.trim(), bound.trim()),
    };
    let valid = |name: &str| {
        !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
    };
    if !valid(key_var) || !valid(value_var) {
        return Err(ParseError::unsupported(
            "list",
            format!("invalid loop binding `{bound}`"),
            span,
        ));
    }

    let (iterable, iterable_name) = if iterable.trim_start().starts_with("<var") {
        let inner = Markup::parse(iterable.trim());
        (variable(&inner)?, inner.body.to_string())
    } else {
        let name = iterable.trim();
        (
            Variable {
                path: parse_path(name),
                default: None,
                filters: Vec::new(),
            },
            name.to_string(),
        )
    };

    let binding = LoopBinding {
        key: key_var,
        value: value_var,
        iterable: &iterable_name,
    };
    let body = TemplatePart::parse_fragment(&rewrite_list_body(markup.body, &binding)?)?;

    Ok(List {
        key_var: SmolStr::new(key_var),
        value_var: SmolStr::new(value_var),
        iterable,
        iterable_name,
        body,
    })
}

fn breakpoint(markup: &Markup<'_>) -> Result<Breakpoint, ParseError> {
    Ok(Breakpoint {
        name: markup.attribute("name").map(SmolStr::new),
        include: markup.attribute("include").map(str::to_string),
        data: optional_part(markup.attribute("data"))?,
        body: TemplatePart::parse_fragment(markup.body)?,
    })
}

fn optional_part(text: Option<&str>) -> Result<Option<TemplatePart>, ParseError> {
    text.map(TemplatePart::parse_fragment).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> PathSegment {
        PathSegment::Field(SmolStr::new(name))
    }

    fn index(raw: &str) -> PathSegment {
        PathSegment::Index(raw.to_string())
    }

    #[test]
    fn test_parse_literal() {
        let part = TemplatePart::parse("  hello   world ").unwrap();
        assert_eq!(part.as_literal(), Some("hello world"));
    }

    #[test]
    fn test_placeholders() {
        let part = TemplatePart::parse("a<var>x</var>b<var>y</var>c").unwrap();
        assert_eq!(part.placeholder_text(), "a{{ph:0}}b{{ph:1}}c");
        assert_eq!(part.children().len(), 2);
        assert_eq!(part.pieces().len(), 3);
    }

    #[test]
    fn test_variable() {
        let part =
            TemplatePart::parse("<var d='none' filter='str, length' length-data='x'>a.b[0]</var>")
                .unwrap();
        let TagKind::Var(var) = &part.children()[0].kind else {
            panic!("expected variable");
        };
        assert_eq!(var.path, vec![field("a"), field("b"), index("0")]);
        assert_eq!(var.default.as_ref().and_then(|d| d.as_literal()), Some("none"));
        let names: Vec<&str> = var.filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["str", "length"]);
        assert!(var.filters[0].argument.is_none());
        assert_eq!(
            var.filters[1].argument.as_ref().and_then(|a| a.as_literal()),
            Some("x")
        );
    }

    #[test]
    fn test_condition_attribute() {
        let part = TemplatePart::parse("<if condition='<var>a</var> > 1'>big</if>").unwrap();
        let TagKind::Condition(cond) = &part.children()[0].kind else {
            panic!("expected condition");
        };
        assert_eq!(cond.condition.placeholder_text(), "{{ph:0}} > 1");
        assert_eq!(cond.on_true.as_literal(), Some("big"));
        assert!(cond.on_false.is_empty());
    }

    #[test]
    fn test_condition_children_override() {
        let part = TemplatePart::parse(
            "<if condition='x'><condition>y</condition><true>T</true><false>F</false></if>",
        )
        .unwrap();
        let TagKind::Condition(cond) = &part.children()[0].kind else {
            panic!("expected condition");
        };
        assert_eq!(cond.condition.as_literal(), Some("y"));
        assert_eq!(cond.on_true.as_literal(), Some("T"));
        assert_eq!(cond.on_false.as_literal(), Some("F"));
    }

    #[test]
    fn test_condition_child_without_branches() {
        let part =
            TemplatePart::parse("<if><condition>a == 1</condition>one</if>").unwrap();
        let TagKind::Condition(cond) = &part.children()[0].kind else {
            panic!("expected condition");
        };
        assert_eq!(cond.condition.as_literal(), Some("a == 1"));
        assert_eq!(cond.on_true.as_literal(), Some("one"));
    }

    #[test]
    fn test_nested_same_name() {
        let part = TemplatePart::parse(
            "<if condition='a'>1<if condition='b'>2</if>3</if><if condition='c'>4</if>",
        )
        .unwrap();
        assert_eq!(part.children().len(), 2);
        let TagKind::Condition(outer) = &part.children()[0].kind else {
            panic!("expected condition");
        };
        assert_eq!(outer.on_true.placeholder_text(), "1{{ph:0}}3");
    }

    #[test]
    fn test_list() {
        let part = TemplatePart::parse(
            "<list for='n' in='<var>numbers</var>'><var>n</var>(<var>i</var>)</list>",
        )
        .unwrap();
        let TagKind::List(list) = &part.children()[0].kind else {
            panic!("expected list");
        };
        assert_eq!(list.key_var, "n");
        assert!(!list.is_destructuring());
        assert_eq!(list.iterable.path, vec![field("numbers")]);
        assert_eq!(list.iterable_name, "numbers");

        let kinds: Vec<&str> = list.body.children().iter().map(|t| t.kind.name()).collect();
        assert_eq!(kinds, vec!["iteration variable", "iteration key"]);

        let TagKind::IterationVar(value) = &list.body.children()[0].kind else {
            panic!("expected iteration variable");
        };
        assert_eq!(value.path, vec![field("numbers"), index("n")]);

        let TagKind::IterationKey(key) = &list.body.children()[1].kind else {
            panic!("expected iteration key");
        };
        assert_eq!(key.name, "n");
        assert_eq!(key.modifier.as_deref(), Some("+1"));
    }

    #[test]
    fn test_list_destructuring() {
        let part =
            TemplatePart::parse("<list for='k, v' in='dict'><var>k</var>:<var>v.x</var></list>")
                .unwrap();
        let TagKind::List(list) = &part.children()[0].kind else {
            panic!("expected list");
        };
        assert!(list.is_destructuring());
        let TagKind::IterationVar(value) = &list.body.children()[1].kind else {
            panic!("expected iteration variable");
        };
        assert_eq!(value.path, vec![field("dict"), index("k"), field("x")]);
    }

    #[test]
    fn test_list_without_for() {
        let err = TemplatePart::parse("<list in='x'>a</list>").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnsupportedTag { ref name, .. } if name == "list"
        ));
    }

    #[test]
    fn test_breakpoint() {
        let part =
            TemplatePart::parse("<breakpoint name='content' data='{}'>x</breakpoint>").unwrap();
        let TagKind::Breakpoint(bp) = &part.children()[0].kind else {
            panic!("expected breakpoint");
        };
        assert_eq!(bp.name.as_deref(), Some("content"));
        assert!(bp.include.is_none());
        assert_eq!(bp.data.as_ref().and_then(|d| d.as_literal()), Some("{}"));
        assert_eq!(bp.body.as_literal(), Some("x"));
    }

    #[test]
    fn test_generic_tag() {
        let part = TemplatePart::parse("<rebase>base</rebase>rest").unwrap();
        assert_eq!(part.children()[0].kind, TagKind::Generic);
        assert_eq!(part.children()[0].raw_body, "base");
    }

    #[test]
    fn test_unreserved_markup_is_literal() {
        let part = TemplatePart::parse("<div class='a'><var>x</var></div>").unwrap();
        assert_eq!(part.placeholder_text(), "<div class='a'>{{ph:0}}</div>");
    }

    #[test]
    fn test_unmatched_closing_tag() {
        let err = TemplatePart::parse("x</if>").unwrap_err();
        assert!(err.is_structural());
    }
}
