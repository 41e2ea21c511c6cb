//! Main orchestration logic.

use crate::bundle;
use crate::cli::Args;
use crate::config::SuitConfig;
use crate::files::{DirectorySource, FsSink};
use crate::output::Failure;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::Instant;
use suit_compiler::{Backend, CompileError, CompileOptions, CompiledTemplate, Compiler, UnitName};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Patterns that are always ignored: the generated `__py__`-style directories.
const DEFAULT_IGNORES: [&str; 1] = ["**/__*__/**"];

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// The workspace path is not usable.
    #[error("invalid workspace `{path}`: {message}")]
    Workspace { path: String, message: String },

    /// Output directories or bundles could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// The outcome of a compile pass.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub compiled: usize,
    pub failures: Vec<Failure>,
}

/// A discovered template file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateFile {
    /// Path relative to the workspace, with `/` separators.
    pub relative: String,
    pub name: UnitName,
}

/// Compiles every template in the workspace.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let workspace = absolute(&args.workspace)?;
    let config = SuitConfig::load(&workspace);
    let extensions = config.file_extensions();

    let ignores = ignore_set(args.ignore.iter().chain(&config.exclude))?;
    let files = discover(&workspace, &extensions, &ignores);
    info!(workspace = %workspace, templates = files.len(), "discovered templates");

    let mut backends: Vec<Backend> = args.backends.iter().copied().map(Backend::from).collect();
    if backends.is_empty() {
        backends = config.backends();
    }
    let options = if backends.is_empty() {
        CompileOptions::default()
    } else {
        CompileOptions { backends }
    };

    let source = DirectorySource::new(workspace.clone(), &extensions);
    let compiler = Compiler::with_options(source, options);
    let sink = if args.check {
        None
    } else {
        Some(FsSink::create(&workspace)?)
    };

    let start = Instant::now();
    let results: Vec<(&TemplateFile, Result<CompiledTemplate, CompileError>)> = files
        .par_iter()
        .map(|file| {
            let result = compiler.compile(file.name.dotted()).and_then(|compiled| {
                if let Some(sink) = &sink {
                    compiled.emit(sink)?;
                }
                Ok(compiled)
            });
            (file, result)
        })
        .collect();

    let mut summary = RunSummary::default();
    for (file, result) in results {
        match result {
            Ok(compiled) => {
                if let Some(backend) = args.emit {
                    let backend = Backend::from(backend);
                    if let Some(text) = compiled.source(backend) {
                        eprintln!("=== {backend} for {} ===\n{text}", file.relative);
                    }
                }
                summary.compiled += 1;
            }
            Err(error) => {
                warn!(template = %file.name, kind = error.kind(), "compile failed");
                summary
                    .failures
                    .push(Failure::new(file.name.dotted(), &file.relative, &error));
            }
        }
    }

    if sink.is_some() && !args.no_bundle {
        let directories = bundle_directories(&files);
        bundle::build(&workspace, &directories)?;
    }

    info!(
        compiled = summary.compiled,
        failed = summary.failures.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "compile pass finished"
    );
    Ok(summary)
}

/// Every template directory and its ancestors, so `a/b/c.html` also feeds `all.a.*`.
fn bundle_directories(files: &[TemplateFile]) -> BTreeSet<String> {
    files
        .iter()
        .flat_map(|file| file.name.directories())
        .map(str::to_string)
        .collect()
}

fn absolute(workspace: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    if workspace.is_absolute() {
        return Ok(workspace.to_path_buf());
    }
    let invalid = |message: String| OrchestratorError::Workspace {
        path: workspace.to_string(),
        message,
    };
    let cwd = std::env::current_dir().map_err(|e| invalid(e.to_string()))?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| invalid(e.to_string()))?;
    Ok(cwd.join(workspace))
}

fn ignore_set<'a>(
    patterns: impl IntoIterator<Item = &'a String>,
) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns
        .into_iter()
        .map(String::as_str)
        .chain(DEFAULT_IGNORES)
    {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Finds template files under `workspace`, sorted by relative path.
fn discover(workspace: &Utf8Path, extensions: &[&str], ignores: &GlobSet) -> Vec<TemplateFile> {
    let mut files: Vec<TemplateFile> = WalkDir::new(workspace)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| Utf8PathBuf::try_from(entry.into_path()).ok())
        .filter_map(|path| {
            let relative = path.strip_prefix(workspace).ok()?.as_str().replace('\\', "/");
            let file_name = path.file_name().unwrap_or_default();
            if !extensions.iter().any(|ext| file_name.ends_with(ext)) {
                return None;
            }
            if ignores.is_match(&relative) {
                debug!(file = relative.as_str(), "ignored");
                return None;
            }
            Some(TemplateFile {
                name: UnitName::from_relative_path(&relative),
                relative,
            })
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_discover_names_and_ignores() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        for file in [
            "index.html",
            "pages/home.html",
            "pages/notes.txt",
            "__js__/stale.html",
            "drafts/wip.html",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }

        let ignores = ignore_set(&["drafts/**".to_string()]).unwrap();
        let files = discover(&root, &[".html"], &ignores);
        let names: Vec<&str> = files.iter().map(|file| file.name.dotted()).collect();
        assert_eq!(names, vec!["index", "pages.home"]);
        assert_eq!(files[1].relative, "pages/home.html");
    }

    #[test]
    fn test_bundle_directories_include_ancestors() {
        let files: Vec<TemplateFile> = ["index.html", "a/d.html", "a/b/c.html", "x/y/z/w.html"]
            .into_iter()
            .map(|relative| TemplateFile {
                name: UnitName::from_relative_path(relative),
                relative: relative.to_string(),
            })
            .collect();
        let directories: Vec<String> = bundle_directories(&files).into_iter().collect();
        assert_eq!(directories, vec!["a", "a.b", "x", "x.y", "x.y.z"]);
    }

    #[test]
    fn test_invalid_glob() {
        let err = ignore_set(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidGlob(_)));
    }
}
