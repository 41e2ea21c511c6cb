//! Names of compiled units and their artifacts.

use std::fmt;

/// A code generation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    Python,
    JavaScript,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Python, Backend::JavaScript];

    /// Short identifier, also the artifact extension.
    pub fn id(self) -> &'static str {
        match self {
            Backend::Python => "py",
            Backend::JavaScript => "js",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|backend| backend.id() == id)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The dotted name of a template (`layouts.base`).
///
/// Generated units are addressed by [`UnitName::unit_id`] (`layouts_base`);
/// the JavaScript registry keeps the dotted form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitName(String);

impl UnitName {
    pub fn new(dotted: impl Into<String>) -> Self {
        Self(dotted.into())
    }

    /// Derives the dotted name from a path relative to the template root,
    /// dropping the file extension: `layouts/base.html` becomes `layouts.base`.
    pub fn from_relative_path(path: &str) -> Self {
        let path = path.trim_start_matches("./");
        let file_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
        let stem = match path[file_start..].rfind('.') {
            Some(dot) if dot > 0 => &path[..file_start + dot],
            _ => path,
        };
        Self(stem.replace(['/', '\\'], "."))
    }

    pub fn dotted(&self) -> &str {
        &self.0
    }

    pub fn registry_name(&self) -> &str {
        &self.0
    }

    pub fn unit_id(&self) -> String {
        self.0.replace('.', "_")
    }

    /// The file name of this unit's artifact with extension `extension`.
    pub fn artifact(&self, extension: &str) -> String {
        format!("{}.{extension}", self.unit_id())
    }

    /// The dotted directory part, if the template is not at the root.
    pub fn directory(&self) -> Option<&str> {
        parent(&self.0)
    }

    /// The dotted directory and each of its ancestors, innermost first.
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(self.directory(), |directory| parent(*directory))
    }
}

fn parent(dotted: &str) -> Option<&str> {
    dotted
        .rsplit_once('.')
        .map(|(directory, _)| directory)
        .filter(|directory| !directory.is_empty())
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unit_name_from_path() {
        let name = UnitName::from_relative_path("layouts/base.html");
        assert_eq!(name.dotted(), "layouts.base");
        assert_eq!(name.unit_id(), "layouts_base");
        assert_eq!(name.artifact("js"), "layouts_base.js");
        assert_eq!(name.directory(), Some("layouts"));
    }

    #[test]
    fn test_unit_name_at_root() {
        let name = UnitName::from_relative_path("./index.html");
        assert_eq!(name.dotted(), "index");
        assert_eq!(name.directory(), None);
        assert_eq!(UnitName::from_relative_path(".hidden").dotted(), ".hidden");
        assert_eq!(UnitName::from_relative_path(".hidden").directory(), None);
    }

    #[test]
    fn test_unit_name_directories() {
        let name = UnitName::from_relative_path("a/b/c.html");
        assert_eq!(name.directory(), Some("a.b"));
        assert_eq!(name.directories().collect::<Vec<_>>(), vec!["a.b", "a"]);
        assert_eq!(UnitName::from_relative_path("index.html").directories().count(), 0);
    }

    #[test]
    fn test_backend_ids() {
        assert_eq!(Backend::from_id("py"), Some(Backend::Python));
        assert_eq!(Backend::from_id("js"), Some(Backend::JavaScript));
        assert_eq!(Backend::from_id("rb"), None);
    }
}
