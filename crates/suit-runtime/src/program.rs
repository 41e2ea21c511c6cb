//! Executable template programs.
//!
//! A [`Node`] tree is what the native backend emits for a template. Evaluating
//! it follows the same contract as the generated Python and JavaScript: lookups
//! degrade to defaults or [`Value::Absent`], conditions and expressions go
//! through the embedded interpreter, loops bind their key by name.

use crate::access::{lookup, Access};
use crate::error::RuntimeError;
use crate::expr;
use crate::filters::Filter;
use crate::scope::Locals;
use crate::value::Value;
use smol_str::SmolStr;

static ABSENT: Value = Value::Absent;

/// One operation of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal output.
    Text(String),
    /// Literal pieces interleaved with children; `pieces.len() == children.len() + 1`.
    Concat {
        pieces: Vec<String>,
        children: Vec<Node>,
    },
    /// A safe data lookup.
    Var {
        path: Vec<Access>,
        default: Option<Box<Node>>,
    },
    Filter {
        filter: Filter,
        input: Box<Node>,
        argument: Option<Box<Node>>,
    },
    /// Collections become JSON text; other values pass through.
    Stringify(Box<Node>),
    /// The value as JSON text, used inside include overlays.
    Json(Box<Node>),
    /// The current key of an enclosing loop, optionally adjusted (`+1`).
    LoopKey {
        name: SmolStr,
        modifier: Option<String>,
    },
    Condition {
        condition: Box<Node>,
        on_true: Box<Node>,
        on_false: Box<Node>,
    },
    /// Renders `body` once per index or key of `iterable`, bound as `bound`.
    List {
        bound: SmolStr,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    /// Evaluates the rendered text of the inner node.
    Expression(Box<Node>),
    /// Renders `body` against the ambient data merged with the JSON object
    /// that `overlay` renders to.
    Scope {
        overlay: Box<Node>,
        body: Box<Node>,
    },
}

/// Evaluation state: the data stack and loop bindings.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    roots: Vec<Value>,
    pub locals: Locals,
}

impl Frame {
    pub fn new(data: Value) -> Self {
        Self {
            roots: vec![data],
            locals: Locals::new(),
        }
    }

    /// Returns the innermost data scope.
    pub fn root(&self) -> &Value {
        self.roots.last().unwrap_or(&ABSENT)
    }
}

impl Node {
    /// Renders the program against JSON data.
    pub fn render(&self, data: &serde_json::Value) -> Result<String, RuntimeError> {
        let mut frame = Frame::new(Value::from(data));
        Ok(self.eval(&mut frame)?.stringify())
    }

    pub fn eval(&self, frame: &mut Frame) -> Result<Value, RuntimeError> {
        match self {
            Node::Text(text) => Ok(Value::Str(text.clone())),
            Node::Concat { pieces, children } => {
                let mut out = String::new();
                for (piece, child) in pieces.iter().zip(children) {
                    out.push_str(piece);
                    out.push_str(&child.eval(frame)?.stringify());
                }
                if let Some(tail) = pieces.get(children.len()) {
                    out.push_str(tail);
                }
                Ok(Value::Str(out))
            }
            Node::Var { path, default } => {
                match lookup(frame.root(), path, &frame.locals) {
                    Some(value) => Ok(value),
                    None => match default {
                        Some(default) => default.eval(frame),
                        None => Ok(Value::Absent),
                    },
                }
            }
            Node::Filter {
                filter,
                input,
                argument,
            } => {
                let input = input.eval(frame)?;
                let argument = argument
                    .as_ref()
                    .map(|argument| argument.eval(frame))
                    .transpose()?;
                filter.apply(input, argument)
            }
            Node::Stringify(inner) => Ok(match inner.eval(frame)? {
                collection @ (Value::List(_) | Value::Map(_)) => Value::Str(collection.stringify()),
                other => other,
            }),
            Node::Json(inner) => Ok(Value::Str(inner.eval(frame)?.to_json().to_string())),
            Node::LoopKey { name, modifier } => match modifier {
                Some(modifier) => expr::evaluate(&format!("{name} {modifier}"), &frame.locals),
                None => frame
                    .locals
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownName {
                        name: name.to_string(),
                    }),
            },
            Node::Condition {
                condition,
                on_true,
                on_false,
            } => {
                let text = condition.eval(frame)?.stringify();
                if expr::evaluate(&text, &frame.locals)?.is_truthy() {
                    on_true.eval(frame)
                } else {
                    on_false.eval(frame)
                }
            }
            Node::List {
                bound,
                iterable,
                body,
            } => {
                let keys: Vec<Value> = match iterable.eval(frame)? {
                    Value::List(items) => (0..items.len()).map(Value::from).collect(),
                    Value::Map(entries) => entries.into_keys().map(Value::Str).collect(),
                    _ => Vec::new(),
                };

                let mut out = String::new();
                for key in keys {
                    frame.locals.push(bound.clone(), key);
                    let rendered = body.eval(frame);
                    frame.locals.pop();
                    out.push_str(&rendered?.stringify());
                }
                Ok(Value::Str(out))
            }
            Node::Expression(inner) => {
                let text = inner.eval(frame)?.stringify();
                expr::evaluate(&text, &frame.locals)
            }
            Node::Scope { overlay, body } => {
                let text = overlay.eval(frame)?.stringify();
                let parsed: serde_json::Value =
                    serde_json::from_str(&text).map_err(|err| RuntimeError::Overlay {
                        message: format!("{err} in `{text}`"),
                    })?;
                let Value::Map(overlay) = Value::from(parsed) else {
                    return Err(RuntimeError::Overlay {
                        message: format!("`{text}` is not an object"),
                    });
                };

                let mut data = match frame.root() {
                    Value::Map(entries) => entries.clone(),
                    _ => Default::default(),
                };
                data.extend(overlay);

                frame.roots.push(Value::Map(data));
                let rendered = body.eval(frame);
                frame.roots.pop();
                rendered
            }
        }
    }
}
