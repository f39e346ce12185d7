//! Template source types used by the prompt manager.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File extensions recognized as prompt templates when loading a directory.
pub(crate) const TEMPLATE_EXTENSIONS: &[&str] = &["j2", "jinja"];

/// A named prompt template and its raw source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template name used for lookup (e.g., `readme/generate`).
    pub name: String,

    /// Raw Jinja2 template source.
    pub source: String,
}

impl PromptTemplate {
    /// Create a template from a name and source.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Derive a template name from a file path relative to `root`.
    ///
    /// `root/readme/generate.j2` becomes `readme/generate`. Returns `None`
    /// for files without a template extension or outside `root`.
    pub(crate) fn name_from_path(root: &Path, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        if !TEMPLATE_EXTENSIONS.contains(&ext) {
            return None;
        }
        let relative = path.strip_prefix(root).ok()?.with_extension("");
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}
