//! In-process rendering.

use crate::compile::Compiler;
use crate::error::{CompileError, RenderError};
use crate::source::TemplateSource;
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};
use suit_runtime::Node;
use tracing::debug;

/// Renders templates by name with the native backend.
///
/// Compiled programs are cached per template name.
///
/// ```
/// use suit_compiler::{Environment, MemorySource};
/// use serde_json::json;
///
/// let source: MemorySource = [("greet", "Hi <var d='you'>name</var>")].into_iter().collect();
/// let env = Environment::new(source);
/// assert_eq!(env.render("greet", &json!({"name": "Ann"})).unwrap(), "Hi Ann");
/// assert_eq!(env.render("greet", &json!({})).unwrap(), "Hi you");
/// ```
#[derive(Debug)]
pub struct Environment<S> {
    compiler: Compiler<S>,
    cache: RwLock<FxHashMap<String, Arc<Node>>>,
}

impl<S: TemplateSource> Environment<S> {
    pub fn new(source: S) -> Self {
        Self {
            compiler: Compiler::new(source),
            cache: RwLock::default(),
        }
    }

    /// Returns the compiled program for `name`, compiling it on first use.
    pub fn program(&self, name: &str) -> Result<Arc<Node>, CompileError> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        if let Some(program) = cached {
            return Ok(program);
        }

        debug!(template = name, "compiling for render");
        let program = Arc::new(self.compiler.compile_native(name)?);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::clone(&program));
        Ok(program)
    }

    /// Renders the template `name` against `data`.
    pub fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let program = self.program(name)?;
        program.render(data).map_err(|source| RenderError::Runtime {
            template: name.to_string(),
            source,
        })
    }

    /// Drops every cached program.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
