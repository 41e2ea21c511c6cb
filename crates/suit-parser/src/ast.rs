//! Tag tree types.
//!
//! A [`TemplatePart`] is literal text interleaved with top-level [`Tag`]s. Every
//! tag field that contains markup is itself a `TemplatePart`, which makes the
//! tree recursive.

use crate::markup::Attributes;
use crate::path::PathSegment;
use smol_str::SmolStr;
use std::fmt::Write;
use suit_span::Span;

/// Literal text with ordered tag children.
///
/// `pieces[i]` is the text before `children[i]`, and the final piece is the
/// text after the last child, so `pieces.len() == children.len() + 1` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePart {
    /// The text this part was parsed from, after normalization.
    pub text: String,
    pub(crate) pieces: Vec<String>,
    pub(crate) children: Vec<Tag>,
}

impl Default for TemplatePart {
    fn default() -> Self {
        Self::literal("")
    }
}

impl TemplatePart {
    /// Creates a part with no tags.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pieces: vec![text.clone()],
            text,
            children: Vec::new(),
        }
    }

    /// Returns the literal pieces around the children.
    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }

    /// Returns the top-level tags.
    pub fn children(&self) -> &[Tag] {
        &self.children
    }

    /// Iterates over `(literal text before the tag, tag)` pairs. The trailing
    /// piece is available through [`TemplatePart::tail`].
    pub fn segments(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.pieces
            .iter()
            .map(String::as_str)
            .zip(self.children.iter())
    }

    /// Returns the literal text after the last child.
    pub fn tail(&self) -> &str {
        self.pieces.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns the text if this part contains no tags.
    pub fn as_literal(&self) -> Option<&str> {
        self.children.is_empty().then(|| self.tail())
    }

    /// Returns true if this part renders nothing.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.tail().is_empty()
    }

    /// Returns a copy without the children matching `drop`; their text is removed too.
    pub fn without(&self, drop: impl Fn(&Tag) -> bool) -> Self {
        let mut text = String::new();
        let mut pieces = vec![String::new()];
        let mut children = Vec::new();

        for (piece, tag) in self.segments() {
            text.push_str(piece);
            if let Some(last) = pieces.last_mut() {
                last.push_str(piece);
            }
            if drop(tag) {
                continue;
            }
            text.push_str(&tag.text);
            children.push(tag.clone());
            pieces.push(String::new());
        }
        text.push_str(self.tail());
        if let Some(last) = pieces.last_mut() {
            last.push_str(self.tail());
        }

        Self {
            text,
            pieces,
            children,
        }
    }

    /// Returns the literal text with `{{ph:N}}` in place of each child.
    pub fn placeholder_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        for (i, (piece, _)) in self.segments().enumerate() {
            out.push_str(piece);
            let _ = write!(out, "{{{{ph:{i}}}}}");
        }
        out.push_str(self.tail());
        out
    }
}

/// A parsed reserved tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// The tag name.
    pub name: SmolStr,
    /// The attributes of the opening portion.
    pub attributes: Attributes,
    /// The unparsed body.
    pub raw_body: String,
    /// The full tag text.
    pub text: String,
    /// The location of the tag in the text of its parent part.
    pub span: Span,
    /// The kind-specific fields.
    pub kind: TagKind,
}

/// The closed set of tag kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TagKind {
    /// `<var>path</var>`
    Var(Variable),
    /// `<iterationvar in= name= path=>`, produced by the list rewriter.
    IterationVar(Variable),
    /// `<iterationkey name= mod=>`, produced by the list rewriter.
    IterationKey(IterationKey),
    /// `<if>`
    Condition(Condition),
    /// `<list for= in=>`
    List(List),
    /// `<expression>`
    Expression(Expression),
    /// `<breakpoint>`
    Breakpoint(Breakpoint),
    /// A reserved name outside its grammar (`true`, `false`, `condition`, `rebase`).
    Generic,
}

impl TagKind {
    /// Returns a short name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            TagKind::Var(_) => "variable",
            TagKind::IterationVar(_) => "iteration variable",
            TagKind::IterationKey(_) => "iteration key",
            TagKind::Condition(_) => "condition",
            TagKind::List(_) => "list",
            TagKind::Expression(_) => "expression",
            TagKind::Breakpoint(_) => "breakpoint",
            TagKind::Generic => "generic",
        }
    }
}

/// A filter applied to a variable: `filter="name"` with an optional `name-data` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    /// The filter name.
    pub name: SmolStr,
    /// The argument markup.
    pub argument: Option<TemplatePart>,
}

/// A data lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The access path.
    pub path: Vec<PathSegment>,
    /// Rendered when the lookup fails (`d` attribute).
    pub default: Option<TemplatePart>,
    /// Filters applied in order.
    pub filters: Vec<FilterCall>,
}

/// A reference to the current loop key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationKey {
    /// The loop-bound name.
    pub name: SmolStr,
    /// A suffix expression applied to the key, e.g. `+1`.
    pub modifier: Option<String>,
}

/// `<if>` with its condition and branches.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub condition: TemplatePart,
    pub on_true: TemplatePart,
    pub on_false: TemplatePart,
}

/// `<list>` after the body has been rewritten for its loop bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    /// The name bound to the index or mapping key.
    pub key_var: SmolStr,
    /// The name bound to the element. Equal to `key_var` unless destructuring.
    pub value_var: SmolStr,
    /// The collection being iterated.
    pub iterable: Variable,
    /// The source text of the iterable path, as referenced by the rewritten body.
    pub iterable_name: String,
    /// The rewritten body.
    pub body: TemplatePart,
}

impl List {
    /// Returns true for `for="key, value"` loops.
    pub fn is_destructuring(&self) -> bool {
        self.key_var != self.value_var
    }
}

/// `<expression>`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub body: TemplatePart,
}

/// `<breakpoint>`: a rebase slot, an include site, or a data scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    /// Slot identity for rebase.
    pub name: Option<SmolStr>,
    /// Template to include.
    pub include: Option<String>,
    /// JSON-shaped overlay for the body.
    pub data: Option<TemplatePart>,
    pub body: TemplatePart,
}
