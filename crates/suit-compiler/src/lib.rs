//! Suit template composition and code generation.
//!
//! This crate turns Suit markup into executable units. It handles:
//! - Loading templates by dotted name from a [`TemplateSource`]
//! - Composing `rebase`, `breakpoint` and `include` into one document
//! - Extracting `<style>` and `<script>` assets
//! - Generating Python and JavaScript units through the [`Syntax`] backends
//! - Rendering in-process with the native backend via [`Environment`]
//!
//! # Example
//!
//! ```
//! use suit_compiler::{Backend, Compiler, MemorySource};
//!
//! let source: MemorySource = [
//!     ("layouts.base", "<h1><breakpoint name='title'>Untitled</breakpoint></h1>"),
//!     ("pages.home", "<rebase>layouts.base</rebase><breakpoint name='title'><var>title</var></breakpoint>"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let compiled = Compiler::new(source).compile("pages.home").unwrap();
//! let js = compiled.source(Backend::JavaScript).unwrap();
//! assert!(js.starts_with("suit.SuitApi.addTemplate(\"pages.home\""));
//! ```

mod codegen;
mod compile;
mod environment;
mod error;
mod source;
pub mod syntax;
mod template;
mod unit;

pub use codegen::compile_part;
pub use compile::{CompileOptions, CompiledTemplate, Compiler, MemorySink, Sink};
pub use environment::Environment;
pub use error::{CompileError, RenderError};
pub use source::{MemorySource, TemplateSource};
pub use syntax::Syntax;
pub use template::Template;
pub use unit::{Backend, UnitName};
