//! Runtime error types.

use thiserror::Error;

/// An error raised while executing a compiled template.
///
/// Failed data lookups are never errors; they resolve to a default or to
/// [`Value::Absent`](crate::Value::Absent). These errors are authoring defects
/// in expressions, filters or include overlays.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The expression text could not be parsed.
    #[error("invalid expression `{expression}`: {message}")]
    Syntax { expression: String, message: String },

    /// A name in an expression is not bound by any enclosing loop.
    #[error("unknown name `{name}`")]
    UnknownName { name: String },

    /// An operator was applied to values it does not support.
    #[error("type error: {message}")]
    Type { message: String },

    /// A filter received a value it cannot handle.
    #[error("filter `{filter}` failed: {message}")]
    Filter { filter: String, message: String },

    /// An include overlay did not render to a JSON object.
    #[error("invalid include overlay: {message}")]
    Overlay { message: String },
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    pub(crate) fn filter(filter: &str, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}
