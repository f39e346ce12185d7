//! Generation engine.
//!
//! The [`Engine`] runs the pipeline for one repository URL: parse the URL,
//! fetch metadata from GitHub, render the prompt, call Gemini, and clean up
//! the returned markdown. Each step depends on the previous one, so the
//! three outbound calls run strictly in sequence.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::config::{EngineConfig, ProjectConfig, load_project_config, resolve_api_key};
use crate::error::CoreError;
use crate::gemini::GeminiClient;
use crate::github::GitHubClient;
use crate::prompt::PromptBuilder;
use crate::repo::RepositoryReference;
use crate::types::{GenerationPrompt, GenerationResult};

/// Opening marker of a fenced code block.
const FENCE: &str = "```";

/// Core engine that turns repository URLs into README markdown.
///
/// Holds no per-request state; one engine can serve concurrent requests.
///
/// # Examples
///
/// ```no_run
/// use readgen_core::{Engine, EngineConfig};
///
/// # async fn example() -> Result<(), readgen_core::CoreError> {
/// let config = EngineConfig::builder()
///     .api_key("my-key".to_owned())
///     .build();
/// let engine = Engine::new(config)?;
///
/// let result = engine.generate("https://github.com/octocat/Hello-World").await?;
/// println!("{}", result.markdown);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Engine {
    github: GitHubClient,
    gemini: GeminiClient,
    prompts: PromptBuilder,
}

impl Engine {
    /// Create an engine from CLI-level configuration.
    ///
    /// Loads the project config file (defaults if it doesn't exist), applies
    /// the CLI overrides, and resolves the API key.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Yaml` or `CoreError::Io` for an unreadable config,
    /// `CoreError::MissingApiKey` if no API key is available, and
    /// `CoreError::Prompt` if override templates fail to load.
    #[instrument(skip_all)]
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        info!(config = %config.config_path().display(), "initializing engine");

        let mut project = load_project_config(config.config_path())?;
        if let Some(model) = config.model() {
            project.gemini.model = model.to_owned();
        }
        let api_key = resolve_api_key(config.api_key())?;

        Self::with_settings(&project, api_key, &config.base_dir())
    }

    /// Create an engine from already-loaded settings.
    ///
    /// Relative prompt include directories are resolved against `base_dir`;
    /// directories that don't exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Prompt` if override templates fail to load and
    /// `CoreError::Http` if an HTTP client cannot be built.
    pub fn with_settings(
        project: &ProjectConfig,
        api_key: impl Into<String>,
        base_dir: &Path,
    ) -> Result<Self, CoreError> {
        let mut pm = readgen_pm::PromptManager::new()?;
        for dir in &project.prompts.include {
            let resolved = if dir.is_absolute() {
                dir.clone()
            } else {
                base_dir.join(dir)
            };
            if resolved.is_dir() {
                let loaded = pm.load_dir(&resolved)?;
                debug!(dir = %resolved.display(), loaded, "loaded custom prompt directory");
            }
        }

        Ok(Self {
            github: GitHubClient::new(project.github.api_url.clone())?,
            gemini: GeminiClient::new(&project.gemini, api_key)?,
            prompts: PromptBuilder::with_manager(pm),
        })
    }

    /// Returns the Gemini model used for generation.
    pub fn model(&self) -> &str {
        self.gemini.model()
    }

    /// Generate a README for the repository at `repo_url`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidUrl` before any network call if the URL is
    /// not a GitHub repository URL. GitHub failures are propagated unchanged
    /// (`NotFound`, `RateLimit`, `HostingApi`, `Http`). Returns
    /// `CoreError::Generation` if the model call fails and
    /// `CoreError::EmptyGeneration` if it returns no text.
    #[instrument(skip(self))]
    pub async fn generate(&self, repo_url: &str) -> Result<GenerationResult, CoreError> {
        let prompt = self.preview_prompt(repo_url).await?;
        let raw = self.gemini.generate(&prompt).await?;
        let markdown = clean_generated_text(&raw)?;

        info!(bytes = markdown.len(), "generated README");
        Ok(GenerationResult { markdown })
    }

    /// Run the pipeline up to prompt rendering, without calling the model.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate) minus the generation errors.
    #[instrument(skip(self))]
    pub async fn preview_prompt(&self, repo_url: &str) -> Result<GenerationPrompt, CoreError> {
        let repo_url = repo_url.trim();
        let reference = RepositoryReference::parse(repo_url)?;
        debug!(repo = %reference, "parsed repository URL");

        let metadata = self
            .github
            .fetch(reference.owner(), reference.name())
            .await?;
        self.prompts.build(repo_url, &metadata)
    }
}

/// Validate and clean raw model output.
///
/// # Errors
///
/// Returns `CoreError::EmptyGeneration` if the text is empty or only
/// whitespace, before or after fence removal.
pub fn clean_generated_text(raw: &str) -> Result<String, CoreError> {
    if raw.trim().is_empty() {
        return Err(CoreError::EmptyGeneration);
    }
    let cleaned = strip_code_fence(raw);
    if cleaned.trim().is_empty() {
        return Err(CoreError::EmptyGeneration);
    }
    Ok(cleaned.to_owned())
}

/// Remove a code fence wrapping the whole text.
///
/// The fence is removed only if the text opens with a "```", "```markdown"
/// or "```md" line (case-insensitive) and ends with a "```" line.
/// Otherwise the text is returned unchanged. Content between the markers,
/// including its final newline, is preserved.
///
/// ```
/// use readgen_core::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```markdown\n# Foo\n...\n```"), "# Foo\n...\n");
/// assert_eq!(strip_code_fence("# Foo\n"), "# Foo\n");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    let Some((tag, body)) = rest.split_once('\n') else {
        return text;
    };
    if !is_document_tag(tag.trim_end_matches('\r').trim()) {
        return text;
    }

    let Some(inner) = body.trim_end().strip_suffix(FENCE) else {
        return text;
    };
    if inner.is_empty() || inner.ends_with('\n') {
        inner
    } else {
        text
    }
}

/// Tags that mark a fence around a whole markdown document. Any other tag
/// opens an ordinary code block that belongs to the README.
fn is_document_tag(tag: &str) -> bool {
    tag.is_empty() || tag.eq_ignore_ascii_case("markdown") || tag.eq_ignore_ascii_case("md")
}
