//! Core pipeline for readgen: GitHub repository metadata in, Gemini-generated
//! README markdown out.

pub mod api;
mod client;
mod config;
mod engine;
mod error;
mod gemini;
mod github;
mod http;
mod prompt;
mod repo;
mod types;

pub use client::{ClientError, GITHUB_URL_PREFIX, ReadmeClient, validate_repo_url};
pub use config::{
    API_KEY_ENV_VARS, DEFAULT_CONFIG_FILE, EngineConfig, GeminiConfig, GitHubConfig,
    ProjectConfig, PromptsConfig, ServerConfig, load_project_config, resolve_api_key,
};
pub use engine::{Engine, clean_generated_text, strip_code_fence};
pub use error::{CoreError, ErrorKind};
pub use gemini::GeminiClient;
pub use github::GitHubClient;
pub use prompt::{PromptBuilder, build_prompt};
pub use repo::{GITHUB_HOST, RepositoryReference};
pub use types::{GenerationPrompt, GenerationResult, MAX_SAMPLE_FILES, RepositoryMetadata};
