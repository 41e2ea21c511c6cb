//! Compiling templates into backend units.

use crate::codegen::compile_part;
use crate::error::CompileError;
use crate::source::TemplateSource;
use crate::syntax::{javascript_unit, python_unit, JavaScript, Native, Python};
use crate::template::Template;
use crate::unit::{Backend, UnitName};
use indexmap::IndexMap;
use std::io;
use std::sync::{Mutex, PoisonError};
use suit_runtime::Node;
use tracing::debug;

/// Compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Backends to generate, in output order.
    pub backends: Vec<Backend>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            backends: Backend::ALL.to_vec(),
        }
    }
}

/// The generated units of one template plus its extracted assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    pub name: UnitName,
    /// One wrapped unit per backend.
    pub sources: IndexMap<Backend, String>,
    pub style: Option<String>,
    pub script: Option<String>,
}

impl CompiledTemplate {
    pub fn source(&self, backend: Backend) -> Option<&str> {
        self.sources.get(&backend).map(String::as_str)
    }

    /// Writes every backend unit and the stylesheet to `sink`.
    ///
    /// The stylesheet is always written, empty when the template has no style.
    pub fn emit(&self, sink: &impl Sink) -> Result<(), CompileError> {
        let sink_error = |err: io::Error| CompileError::Sink {
            unit: self.name.to_string(),
            message: err.to_string(),
        };
        for (backend, text) in &self.sources {
            sink.emit(&self.name, backend.id(), text)
                .map_err(sink_error)?;
        }
        sink.emit(&self.name, "css", self.style.as_deref().unwrap_or_default())
            .map_err(sink_error)
    }
}

/// Receives generated artifacts.
pub trait Sink {
    /// Stores `text` as the `artifact` (`py`, `js`, `css`) of `unit`.
    fn emit(&self, unit: &UnitName, artifact: &str, text: &str) -> io::Result<()>;
}

/// A sink that keeps artifacts in memory, keyed by file name (`a_b.js`).
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<IndexMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
            .cloned()
    }

    pub fn into_files(self) -> IndexMap<String, String> {
        self.files.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn emit(&self, unit: &UnitName, artifact: &str, text: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(unit.artifact(artifact), text.to_string());
        Ok(())
    }
}

/// Compiles templates loaded from a [`TemplateSource`].
#[derive(Debug, Clone)]
pub struct Compiler<S> {
    source: S,
    options: CompileOptions,
}

impl<S: TemplateSource> Compiler<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, CompileOptions::default())
    }

    pub fn with_options(source: S, options: CompileOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loads, composes and compiles the template `name`.
    pub fn compile(&self, name: &str) -> Result<CompiledTemplate, CompileError> {
        let template = Template::load(name, &self.source)?;
        self.compile_template(&template)
    }

    /// Compiles an already composed template.
    pub fn compile_template(&self, template: &Template) -> Result<CompiledTemplate, CompileError> {
        let part = template.parse()?;
        let name = UnitName::new(&template.name);

        let mut sources = IndexMap::new();
        for &backend in &self.options.backends {
            let unit = match backend {
                Backend::Python => {
                    let compiled = compile_part(&Python, &template.name, &part)?;
                    python_unit(&name.unit_id(), &compiled)
                }
                Backend::JavaScript => {
                    let compiled = compile_part(&JavaScript, &template.name, &part)?;
                    javascript_unit(name.registry_name(), &compiled, template.script.as_deref())
                }
            };
            sources.insert(backend, unit);
        }
        debug!(template = %name, backends = sources.len(), "compiled unit");

        Ok(CompiledTemplate {
            name,
            sources,
            style: template.style.clone(),
            script: template.script.clone(),
        })
    }

    /// Compiles the template `name` into a program the runtime executes directly.
    pub fn compile_native(&self, name: &str) -> Result<Node, CompileError> {
        let template = Template::load(name, &self.source)?;
        let part = template.parse()?;
        compile_part(&Native, &template.name, &part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;

    fn source() -> MemorySource {
        [
            ("pages.home", "<style>p {}</style><p><var>title</var></p>"),
            ("pages.plain", "hi"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_compile_both_backends() {
        let compiled = Compiler::new(source()).compile("pages.home").unwrap();
        assert_eq!(compiled.name.unit_id(), "pages_home");
        assert_eq!(compiled.style.as_deref(), Some("p {}"));
        assert_eq!(
            compiled.sources.keys().copied().collect::<Vec<_>>(),
            vec![Backend::Python, Backend::JavaScript]
        );
        let python = compiled.source(Backend::Python).unwrap();
        assert!(python.contains("class pages_home(object):"));
        let js = compiled.source(Backend::JavaScript).unwrap();
        assert!(js.starts_with("suit.SuitApi.addTemplate(\"pages.home\""));
    }

    #[test]
    fn test_selected_backend_only() {
        let options = CompileOptions {
            backends: vec![Backend::JavaScript],
        };
        let compiled = Compiler::with_options(source(), options)
            .compile("pages.plain")
            .unwrap();
        assert_eq!(compiled.source(Backend::Python), None);
        assert!(compiled.source(Backend::JavaScript).is_some());
    }

    #[test]
    fn test_emit_to_memory_sink() {
        let compiled = Compiler::new(source()).compile("pages.plain").unwrap();
        let sink = MemorySink::new();
        compiled.emit(&sink).unwrap();
        assert_eq!(sink.get("pages_plain.css").as_deref(), Some(""));
        let files = sink.into_files();
        assert_eq!(
            files.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["pages_plain.py", "pages_plain.js", "pages_plain.css"]
        );
    }

    #[test]
    fn test_compile_missing_template() {
        let err = Compiler::new(source()).compile("pages.gone").unwrap_err();
        assert_eq!(err.kind(), "template-not-found");
    }
}
