//! Loop-local bindings.

use crate::value::Value;
use smol_str::SmolStr;

/// Names bound by enclosing loops, innermost last.
#[derive(Debug, Clone, Default)]
pub struct Locals {
    bindings: Vec<(SmolStr, Value)>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the innermost binding of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn push(&mut self, name: impl Into<SmolStr>, value: Value) {
        self.bindings.push((name.into(), value));
    }

    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<N: Into<SmolStr>> FromIterator<(N, Value)> for Locals {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
