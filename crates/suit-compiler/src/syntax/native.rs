//! In-process emitter producing [`suit_runtime::Node`] programs.

use super::Syntax;
use suit_parser::PathSegment;
use suit_runtime::{Access, Filter, Node};

/// Emits runtime programs instead of source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl Syntax for Native {
    type Output = Node;

    fn literal(&self, pieces: &[String], children: Vec<Node>) -> Node {
        if children.is_empty() {
            return Node::Text(pieces.concat());
        }
        Node::Concat {
            pieces: pieces.to_vec(),
            children,
        }
    }

    fn var(&self, path: &[PathSegment], default: Option<Node>) -> Node {
        Node::Var {
            path: path
                .iter()
                .map(|segment| match segment {
                    PathSegment::Field(name) => Access::Field(name.clone()),
                    PathSegment::Index(raw) => Access::Index(raw.clone()),
                })
                .collect(),
            default: default.map(Box::new),
        }
    }

    fn filter(&self, filter: Filter, input: Node, argument: Option<Node>) -> Node {
        Node::Filter {
            filter,
            input: Box::new(input),
            argument: argument.map(Box::new),
        }
    }

    fn stringify(&self, value: Node) -> Node {
        Node::Stringify(Box::new(value))
    }

    fn json(&self, value: Node) -> Node {
        Node::Json(Box::new(value))
    }

    fn loop_key(&self, name: &str, modifier: Option<&str>) -> Node {
        Node::LoopKey {
            name: name.into(),
            modifier: modifier.map(str::to_string),
        }
    }

    fn condition(&self, condition: Node, on_true: Node, on_false: Node) -> Node {
        Node::Condition {
            condition: Box::new(condition),
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        }
    }

    fn list(&self, body: Node, bound: &str, iterable: Node) -> Node {
        Node::List {
            bound: bound.into(),
            iterable: Box::new(iterable),
            body: Box::new(body),
        }
    }

    fn expression(&self, inner: Node) -> Node {
        Node::Expression(Box::new(inner))
    }

    fn scope(&self, overlay: Node, body: Node) -> Node {
        Node::Scope {
            overlay: Box::new(overlay),
            body: Box::new(body),
        }
    }
}
