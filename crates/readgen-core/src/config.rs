//! Configuration types for readgen-core.
//!
//! [`EngineConfig`] carries CLI-level overrides and [`ProjectConfig`] is read
//! from `readgen.yaml`. When the engine is built, values in `EngineConfig`
//! take precedence over the file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::CoreError;

/// Config file name looked up in the working directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "readgen.yaml";

/// Environment variables consulted for the Gemini API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

// ── Engine Configuration (CLI-level) ─────────────────────────

/// Engine configuration provided by the CLI layer.
///
/// # Examples
///
/// ```
/// use readgen_core::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .config_path("/etc/readgen.yaml")
///     .model("gemini-2.5-pro".to_owned())
///     .build();
///
/// assert_eq!(config.model(), Some("gemini-2.5-pro"));
/// ```
#[derive(Clone, Serialize, TypedBuilder)]
pub struct EngineConfig {
    /// Path to the YAML config file. A missing file means defaults.
    #[builder(default = PathBuf::from(DEFAULT_CONFIG_FILE), setter(into))]
    config_path: PathBuf,

    /// Override the Gemini model (takes precedence over the config file).
    #[builder(default, setter(into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,

    /// Gemini API key. Falls back to the environment when absent.
    #[builder(default, setter(into))]
    #[serde(skip)]
    api_key: Option<String>,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("config_path", &self.config_path)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl EngineConfig {
    /// Returns the config file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the model override, if set.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Returns the API key override, if set.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Directory that relative paths in the config file are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

// ── Project Configuration (readgen.yaml) ─────────────────────

/// Settings deserialized from `readgen.yaml`.
///
/// Every field has a serde default, so an empty or partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Prompt template override directories.
    #[serde(default)]
    pub prompts: PromptsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// GitHub REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    /// API base URL.
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
        }
    }
}

/// Gemini generation settings.
///
/// The defaults favor template-adherent output over creative variation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling bound.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: default_gemini_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// Prompt template configuration.
///
/// Templates found in these directories replace built-in templates with the
/// same name. Relative paths are resolved against the config file's directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsConfig {
    #[serde(default)]
    pub include: Vec<PathBuf>,
}

/// HTTP server settings for `readgen serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// ── Default value functions for serde ────────────────────────

fn default_github_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_owned()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_owned()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    0.95
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_owned()
}

// ── Config loading ───────────────────────────────────────────

/// Load [`ProjectConfig`] from a YAML file.
///
/// If the file does not exist, returns the default configuration.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file exists but cannot be read.
/// Returns `CoreError::Yaml` if the file contains invalid YAML.
pub fn load_project_config(config_path: &Path) -> Result<ProjectConfig, CoreError> {
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = std::fs::read_to_string(config_path)?;
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    let config: ProjectConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Resolve the Gemini API key: explicit override first, then the
/// environment variables in [`API_KEY_ENV_VARS`].
///
/// # Errors
///
/// Returns `CoreError::MissingApiKey` if no non-empty key is found.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String, CoreError> {
    resolve_api_key_with(explicit, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    explicit: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, CoreError> {
    explicit
        .map(str::to_owned)
        .into_iter()
        .chain(API_KEY_ENV_VARS.iter().filter_map(|&name| lookup(name)))
        .map(|key| key.trim().to_owned())
        .find(|key| !key.is_empty())
        .ok_or(CoreError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_build_engine_config_with_defaults() {
        let config = EngineConfig::builder().build();

        assert_eq!(config.config_path(), Path::new(DEFAULT_CONFIG_FILE));
        assert!(config.model().is_none());
        assert!(config.api_key().is_none());
        assert_eq!(config.base_dir(), PathBuf::new());
    }

    #[test]
    fn test_should_build_engine_config_with_overrides() {
        let config = EngineConfig::builder()
            .config_path("/srv/readgen/readgen.yaml")
            .model("gemini-2.5-pro".to_owned())
            .api_key(Some("secret".to_owned()))
            .build();

        assert_eq!(config.model(), Some("gemini-2.5-pro"));
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.base_dir(), PathBuf::from("/srv/readgen"));
    }

    #[test]
    fn test_should_not_leak_api_key() {
        let config = EngineConfig::builder()
            .api_key("secret".to_owned())
            .build();

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));

        let value = serde_json::to_value(&config).expect("should serialize");
        assert!(value.get("api_key").is_none());
        // model should be absent (skip_serializing_if)
        assert!(value.get("model").is_none());
        assert_eq!(value["config_path"], json!(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_should_deserialize_default_project_config() {
        let config: ProjectConfig = serde_yaml::from_str("{}").expect("should parse");

        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(
            config.gemini.api_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!((config.gemini.temperature - 0.3).abs() < f32::EPSILON);
        assert!((config.gemini.top_p - 0.95).abs() < f32::EPSILON);
        assert!(config.prompts.include.is_empty());
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_should_deserialize_full_project_config() {
        let yaml = r#"
github:
  apiUrl: https://github.example.com/api/v3
gemini:
  apiUrl: http://localhost:9000
  model: gemini-2.5-pro
  temperature: 0.1
  topP: 0.8
prompts:
  include:
    - prompts
server:
  bind: 0.0.0.0:8080
"#;

        let config: ProjectConfig = serde_yaml::from_str(yaml).expect("should parse YAML");

        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.gemini.api_url, "http://localhost:9000");
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert!((config.gemini.top_p - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.prompts.include, vec![PathBuf::from("prompts")]);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_should_load_default_when_config_file_missing() {
        let config = load_project_config(Path::new("/nonexistent/readgen.yaml"))
            .expect("should return default");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_should_load_config_from_tempfile() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&config_path, "gemini:\n  model: test-model\n").expect("should write config");

        let config = load_project_config(&config_path).expect("should load config");
        assert_eq!(config.gemini.model, "test-model");
        // Defaults should still apply for unspecified fields
        assert!((config.gemini.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn test_should_treat_empty_file_as_defaults() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&config_path, "\n").expect("should write config");

        let config = load_project_config(&config_path).expect("should load config");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_should_reject_invalid_yaml() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&config_path, "gemini: [unclosed").expect("should write config");

        let result = load_project_config(&config_path);
        assert!(matches!(result, Err(CoreError::Yaml(_))));
    }

    #[test]
    fn test_should_prefer_explicit_api_key() {
        let key = resolve_api_key_with(Some("explicit"), |_| Some("from-env".to_owned()))
            .expect("should resolve");
        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_should_check_env_vars_in_order() {
        let key = resolve_api_key_with(None, |name| match name {
            "GEMINI_API_KEY" => Some("  ".to_owned()),
            "API_KEY" => Some("legacy".to_owned()),
            _ => None,
        })
        .expect("should resolve");
        assert_eq!(key, "legacy");
    }

    #[test]
    fn test_should_fail_without_api_key() {
        let result = resolve_api_key_with(Some(""), |_| None);
        assert!(matches!(result, Err(CoreError::MissingApiKey)));
    }
}
