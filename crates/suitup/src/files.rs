//! Filesystem collaborators: template lookup and artifact output.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use suit_compiler::{Sink, TemplateSource, UnitName};

/// Loads templates from a directory: `layouts.base` is `<root>/layouts/base<ext>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: Utf8PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<Utf8PathBuf>, extensions: &[&str]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// The candidate files for `name`, one per extension.
    fn candidates<'a>(&'a self, name: &str) -> impl Iterator<Item = Utf8PathBuf> + 'a {
        let relative = name.replace('.', "/");
        self.extensions
            .iter()
            .map(move |ext| self.root.join(format!("{relative}{ext}")))
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, name: &str) -> Option<String> {
        self.candidates(name)
            .find_map(|path| fs::read_to_string(path).ok())
    }
}

/// Writes artifacts under `<root>/__py__`, `<root>/__js__` and `<root>/__css__`.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: Utf8PathBuf,
}

impl FsSink {
    /// Creates the output directories and the `__py__` package marker.
    pub fn create(root: &Utf8Path) -> io::Result<Self> {
        for artifact in ARTIFACTS {
            fs::create_dir_all(output_dir(root, artifact))?;
        }
        let marker = output_dir(root, "py").join("__init__.py");
        if !marker.exists() {
            fs::write(marker, "")?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl Sink for FsSink {
    fn emit(&self, unit: &UnitName, artifact: &str, text: &str) -> io::Result<()> {
        fs::write(output_dir(&self.root, artifact).join(unit.artifact(artifact)), text)
    }
}

/// Every artifact kind the CLI writes.
pub const ARTIFACTS: [&str; 3] = ["py", "js", "css"];

/// The directory holding artifacts of kind `artifact`.
pub fn output_dir(root: &Utf8Path, artifact: &str) -> Utf8PathBuf {
    root.join(format!("__{artifact}__"))
}
