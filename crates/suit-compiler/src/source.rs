//! Template lookup by dotted name.

use indexmap::IndexMap;

/// Resolves a dotted template name (`layouts.base`) to its markup.
pub trait TemplateSource {
    /// Returns the markup of `name`, or `None` if no such template exists.
    fn load(&self, name: &str) -> Option<String>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn load(&self, name: &str) -> Option<String> {
        (**self).load(name)
    }
}

/// Templates held in memory, keyed by dotted name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: IndexMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, name: impl Into<String>, markup: impl Into<String>) -> &mut Self {
        self.templates.insert(name.into(), markup.into());
        self
    }

    /// Iterates over template names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }
}

impl<N: Into<String>, M: Into<String>> FromIterator<(N, M)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (N, M)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(name, markup)| (name.into(), markup.into()))
                .collect(),
        }
    }
}

/// Strips the quotes a directive may put around a template name.
pub(crate) fn unquote_name(raw: &str) -> &str {
    raw.trim().trim_matches('\'').trim_matches('"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new();
        source.insert("a.b", "<p>x</p>");
        assert_eq!(source.load("a.b").as_deref(), Some("<p>x</p>"));
        assert_eq!(source.load("a.c"), None);
        assert_eq!(source.names().collect::<Vec<_>>(), vec!["a.b"]);
    }

    #[test]
    fn test_unquote_name() {
        assert_eq!(unquote_name(" 'layouts.base' "), "layouts.base");
        assert_eq!(unquote_name("\"x\""), "x");
        assert_eq!(unquote_name("plain"), "plain");
    }
}
