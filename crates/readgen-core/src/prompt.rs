//! README prompt construction.
//!
//! Maps [`RepositoryMetadata`] onto the `readme/generate` template. The only
//! branching is the installation and workflow guidance, chosen from ordered
//! rule tables where the first matching rule wins.

use readgen_pm::{PromptManager, README_TEMPLATE};
use serde::Serialize;
use tracing::instrument;

use crate::error::CoreError;
use crate::types::{GenerationPrompt, RepositoryMetadata};

/// How a guidance rule recognizes a file in the sampled tree.
#[derive(Debug, Clone, Copy)]
enum PathPattern {
    /// The last path segment equals the given name.
    FileName(&'static str),
    /// The path starts with the given prefix.
    Prefix(&'static str),
}

impl PathPattern {
    fn matches(self, path: &str) -> bool {
        match self {
            Self::FileName(name) => path.rsplit('/').next() == Some(name),
            Self::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

/// A conditional instruction: `{path}` in the text is replaced by the
/// matching file path.
#[derive(Debug, Clone, Copy)]
struct GuidanceRule {
    pattern: PathPattern,
    text: &'static str,
}

const INSTALLATION_RULES: &[GuidanceRule] = &[
    GuidanceRule {
        pattern: PathPattern::FileName("package.json"),
        text: "Provide accurate installation steps. The repository contains '{path}', so suggest 'npm install'.",
    },
    GuidanceRule {
        pattern: PathPattern::FileName("requirements.txt"),
        text: "Provide accurate installation steps. The repository contains '{path}', so suggest 'pip install -r requirements.txt'.",
    },
    GuidanceRule {
        pattern: PathPattern::FileName("pom.xml"),
        text: "Provide accurate installation steps. The repository contains '{path}', so suggest building with Maven ('mvn install').",
    },
    GuidanceRule {
        pattern: PathPattern::FileName("Cargo.toml"),
        text: "Provide accurate installation steps. The repository contains '{path}', so suggest 'cargo build --release' or 'cargo install'.",
    },
];

const WORKFLOW_RULES: &[GuidanceRule] = &[
    GuidanceRule {
        pattern: PathPattern::Prefix(".github/workflows/"),
        text: "The repository contains the GitHub Actions workflow '{path}'. Describe the CI/CD pipeline it defines.",
    },
    GuidanceRule {
        pattern: PathPattern::FileName(".gitlab-ci.yml"),
        text: "The repository contains the GitLab CI configuration '{path}'. Describe the CI/CD pipeline it defines.",
    },
];

/// Describe the project for fallback guidance, e.g. "a Rust project".
fn project_kind(metadata: &RepositoryMetadata) -> String {
    match metadata.primary_language() {
        Some(language) => format!("a {language} project"),
        None => "this project".to_owned(),
    }
}

/// Return the text of the first rule matching any path, with `{path}` filled in.
fn first_match(rules: &[GuidanceRule], paths: &[String]) -> Option<String> {
    rules.iter().find_map(|rule| {
        paths
            .iter()
            .find(|path| rule.pattern.matches(path))
            .map(|path| rule.text.replace("{path}", path))
    })
}

fn installation_guidance(metadata: &RepositoryMetadata) -> String {
    first_match(INSTALLATION_RULES, metadata.sample_file_paths()).unwrap_or_else(|| {
        format!(
            "Provide accurate installation steps. No recognizable build manifest was found, so give the typical steps for {}.",
            project_kind(metadata)
        )
    })
}

fn workflow_guidance(metadata: &RepositoryMetadata) -> String {
    first_match(WORKFLOW_RULES, metadata.sample_file_paths()).unwrap_or_else(|| {
        format!(
            "No CI configuration was found. Describe a typical development workflow for {}.",
            project_kind(metadata)
        )
    })
}

#[derive(Debug, Serialize)]
struct PromptContext<'a> {
    repo_url: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    language: Option<&'a str>,
    topics: &'a [String],
    license: Option<&'a str>,
    files: &'a [String],
    installation_guidance: String,
    workflow_guidance: String,
}

/// Renders README generation prompts from repository metadata.
///
/// Output depends only on the inputs and the registered template, so equal
/// inputs always produce byte-identical prompts.
#[derive(Debug)]
pub struct PromptBuilder {
    manager: PromptManager,
}

impl PromptBuilder {
    /// Create a builder using the built-in template.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Prompt` if the built-in template fails to load.
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self::with_manager(PromptManager::new()?))
    }

    /// Create a builder over a manager that may carry template overrides.
    pub fn with_manager(manager: PromptManager) -> Self {
        Self { manager }
    }

    /// Render the prompt for the repository at `repo_url`.
    ///
    /// # Errors
    ///
    /// The built-in template always renders. Returns `CoreError::Prompt` only
    /// when an override template fails to render.
    #[instrument(skip_all, fields(repo = metadata.name()))]
    pub fn build(
        &self,
        repo_url: &str,
        metadata: &RepositoryMetadata,
    ) -> Result<GenerationPrompt, CoreError> {
        let ctx = PromptContext {
            repo_url,
            name: metadata.name(),
            description: metadata.description(),
            language: metadata.primary_language(),
            topics: metadata.topics(),
            license: metadata.license_name(),
            files: metadata.sample_file_paths(),
            installation_guidance: installation_guidance(metadata),
            workflow_guidance: workflow_guidance(metadata),
        };
        let text = self.manager.render(README_TEMPLATE, &ctx)?;
        Ok(GenerationPrompt::new(text))
    }
}

/// Render a prompt with the built-in template.
///
/// # Errors
///
/// Returns `CoreError::Prompt` only if the built-in template is broken.
pub fn build_prompt(
    repo_url: &str,
    metadata: &RepositoryMetadata,
) -> Result<GenerationPrompt, CoreError> {
    PromptBuilder::new()?.build(repo_url, metadata)
}
