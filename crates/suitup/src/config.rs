//! Configuration loading.

use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use suit_compiler::Backend;
use tracing::warn;

/// The project file read from the workspace root.
pub const CONFIG_FILE: &str = "suit.json";

/// Project configuration from `suit.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuitConfig {
    /// Template file extensions, with the leading dot.
    pub extensions: Vec<String>,

    /// Glob patterns to exclude, relative to the workspace.
    pub exclude: Vec<String>,

    /// Backend ids (`py`, `js`) to generate.
    pub backends: Vec<String>,
}

impl SuitConfig {
    /// Loads `suit.json` from `root`, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load(root: &Utf8Path) -> Self {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str(&remove_json_comments(&content)).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path, error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Returns the file extensions to compile.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            vec![".html"]
        } else {
            self.extensions.iter().map(String::as_str).collect()
        }
    }

    /// Returns the configured backends; unknown ids are skipped.
    pub fn backends(&self) -> Vec<Backend> {
        self.backends
            .iter()
            .filter_map(|id| {
                let backend = Backend::from_id(id);
                if backend.is_none() {
                    warn!(backend = id.as_str(), "unknown backend in {CONFIG_FILE}");
                }
                backend
            })
            .collect()
    }
}

/// Removes `//` and `/* */` comments outside of strings.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '*' && chars.next_if_eq(&'/').is_some() {
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remove_comments() {
        let json = r#"{
            // line
            "url": "http://x" /* inline */
        }"#;
        let cleaned = remove_json_comments(json);
        assert!(!cleaned.contains("line"));
        assert!(!cleaned.contains("inline"));
        assert!(cleaned.contains("\"http://x\""));
    }

    #[test]
    fn test_defaults() {
        let config = SuitConfig::default();
        assert_eq!(config.file_extensions(), vec![".html"]);
        assert!(config.backends().is_empty());
    }

    #[test]
    fn test_load_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(
            root.join(CONFIG_FILE),
            r#"{ "extensions": [".suit"], "exclude": ["drafts/**"], "backends": ["js", "rb"] }"#,
        )
        .unwrap();

        let config = SuitConfig::load(&root);
        assert_eq!(config.file_extensions(), vec![".suit"]);
        assert_eq!(config.exclude, vec!["drafts/**".to_string()]);
        assert_eq!(config.backends(), vec![Backend::JavaScript]);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join(CONFIG_FILE), "{ nope").unwrap();
        assert_eq!(SuitConfig::load(&root), SuitConfig::default());
    }
}
