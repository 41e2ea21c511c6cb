//! Runtime support for compiled Suit templates.
//!
//! This crate holds everything a compiled template needs when it runs:
//!
//! - [`Value`]: template data, including the [`Value::Absent`] sentinel
//! - [`lookup`]: safe data access that never fails
//! - [`Filter`]: the variable filters
//! - [`expr`]: a small interpreter for condition and expression bodies
//! - [`Node`]: an executable template program
//!
//! # Example
//!
//! ```
//! use suit_runtime::{Access, Node};
//! use serde_json::json;
//!
//! let program = Node::Concat {
//!     pieces: vec!["Hello, ".into(), "!".into()],
//!     children: vec![Node::Stringify(Box::new(Node::Var {
//!         path: vec![Access::Field("name".into())],
//!         default: None,
//!     }))],
//! };
//! assert_eq!(program.render(&json!({"name": "Ann"})).unwrap(), "Hello, Ann!");
//! assert_eq!(program.render(&json!({})).unwrap(), "Hello, SuitNone()!");
//! ```

mod access;
mod error;
pub mod expr;
mod filters;
mod program;
mod scope;
mod value;

pub use access::{lookup, Access};
pub use error::RuntimeError;
pub use filters::Filter;
pub use program::{Frame, Node};
pub use scope::Locals;
pub use value::{Value, ABSENT_MARKER};
