//! Values passed between pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Maximum number of file paths sampled from the repository tree.
pub const MAX_SAMPLE_FILES: usize = 30;

/// Repository attributes gathered from the GitHub API.
///
/// `sample_file_paths` never holds more than [`MAX_SAMPLE_FILES`] entries:
/// the builder truncates longer inputs, keeping the first entries in order.
///
/// # Examples
///
/// ```
/// use readgen_core::RepositoryMetadata;
///
/// let metadata = RepositoryMetadata::builder()
///     .name("Hello-World")
///     .primary_language(Some("C".to_owned()))
///     .build();
///
/// assert!(metadata.description().is_none());
/// assert!(metadata.sample_file_paths().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TypedBuilder)]
pub struct RepositoryMetadata {
    #[builder(setter(into))]
    name: String,

    #[builder(default)]
    description: Option<String>,

    #[builder(default)]
    primary_language: Option<String>,

    #[builder(default)]
    topics: Vec<String>,

    #[builder(default)]
    license_name: Option<String>,

    #[builder(
        default,
        setter(transform = |paths: Vec<String>| paths.into_iter().take(MAX_SAMPLE_FILES).collect())
    )]
    sample_file_paths: Vec<String>,
}

impl RepositoryMetadata {
    /// Returns the repository name as reported by GitHub.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn primary_language(&self) -> Option<&str> {
        self.primary_language.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn license_name(&self) -> Option<&str> {
        self.license_name.as_deref()
    }

    /// Returns the sampled file paths in tree order.
    pub fn sample_file_paths(&self) -> &[String] {
        &self.sample_file_paths
    }
}

/// The rendered instruction text sent to the generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The generated README, with any wrapping code fence removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub markdown: String,
}
