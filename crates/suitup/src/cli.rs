//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use suit_compiler::Backend;

/// Compiles Suit templates into Python and JavaScript units.
#[derive(Debug, Parser)]
#[command(name = "suitup")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the templates
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Backends to generate (default: all)
    #[arg(long = "backend", value_enum)]
    pub backends: Vec<BackendArg>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print the generated units of one backend to stderr (for debugging)
    #[arg(long, value_enum)]
    pub emit: Option<BackendArg>,

    /// Skip the aggregate `all.*` build files
    #[arg(long = "no-bundle")]
    pub no_bundle: bool,

    /// Compile without writing anything
    #[arg(long)]
    pub check: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per failed template (default)
    #[default]
    Human,
    /// JSON array of failures
    Json,
}

/// A backend named on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BackendArg {
    Py,
    Js,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Py => Backend::Python,
            BackendArg::Js => Backend::JavaScript,
        }
    }
}
