//! Compilation error types.

use suit_parser::ParseError;
use suit_runtime::RuntimeError;
use thiserror::Error;

/// An error that stops a template from compiling.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// The template markup is malformed.
    #[error("{template}: {source}")]
    Parse {
        template: String,
        #[source]
        source: ParseError,
    },

    /// A template rebases onto itself through its parents.
    #[error("rebase cycle: {}", chain.join(" -> "))]
    RebaseCycle { chain: Vec<String> },

    /// A template includes itself through its includes.
    #[error("include cycle: {}", chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    /// A rebase or include target does not exist.
    #[error("{requested_by}: template `{name}` not found")]
    TemplateNotFound { name: String, requested_by: String },

    /// A tag appears where its grammar does not allow it.
    #[error("{template}: unsupported `<{tag}>`: {message}")]
    Unsupported {
        template: String,
        tag: String,
        message: String,
    },

    /// A compiled artifact could not be written.
    #[error("{unit}: cannot write artifact: {message}")]
    Sink { unit: String, message: String },
}

impl CompileError {
    /// Returns the template the error is reported against.
    pub fn template(&self) -> &str {
        match self {
            CompileError::Parse { template, .. } | CompileError::Unsupported { template, .. } => {
                template
            }
            CompileError::RebaseCycle { chain } | CompileError::IncludeCycle { chain } => {
                chain.first().map(String::as_str).unwrap_or_default()
            }
            CompileError::TemplateNotFound { requested_by, .. } => requested_by,
            CompileError::Sink { unit, .. } => unit,
        }
    }

    /// Returns a short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Parse { source, .. } if source.is_structural() => "structure",
            CompileError::Parse { .. } => "parse",
            CompileError::RebaseCycle { .. } => "rebase-cycle",
            CompileError::IncludeCycle { .. } => "include-cycle",
            CompileError::TemplateNotFound { .. } => "template-not-found",
            CompileError::Unsupported { .. } => "unsupported",
            CompileError::Sink { .. } => "sink",
        }
    }
}

/// An error from [`Environment::render`](crate::Environment::render).
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The compiled template failed while running.
    #[error("{template}: {source}")]
    Runtime {
        template: String,
        #[source]
        source: RuntimeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages_name_the_template() {
        let err = CompileError::TemplateNotFound {
            name: "layouts.base".into(),
            requested_by: "pages.home".into(),
        };
        assert_eq!(err.to_string(), "pages.home: template `layouts.base` not found");
        assert_eq!(err.template(), "pages.home");

        let err = CompileError::RebaseCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "rebase cycle: a -> b -> a");
        assert_eq!(err.kind(), "rebase-cycle");
    }
}
