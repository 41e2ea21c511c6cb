//! Output formatting.

use crate::cli::OutputFormat;
use serde::Serialize;
use suit_compiler::CompileError;

/// A template that failed to compile.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    /// The dotted template name.
    pub template: String,
    /// The template file, relative to the workspace.
    #[serde(skip)]
    pub file: String,
    pub message: String,
    /// Short machine-readable error kind.
    pub kind: &'static str,
}

impl Failure {
    pub fn new(template: &str, file: &str, error: &CompileError) -> Self {
        Self {
            template: template.to_string(),
            file: file.to_string(),
            message: error.to_string(),
            kind: error.kind(),
        }
    }
}

/// Formats failures for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, failures: &[Failure]) -> String {
        match self.format {
            OutputFormat::Human => failures
                .iter()
                .map(|failure| format!("{}: error: {}\n", failure.file, failure.message))
                .collect(),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(failures)
                    .unwrap_or_else(|_| "[]".to_string());
                json.push('\n');
                json
            }
        }
    }
}
