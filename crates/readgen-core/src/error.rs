use thiserror::Error;

/// Errors produced by the generation pipeline.
///
/// The `Display` text of each variant is the user-facing message returned
/// across the HTTP boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid GitHub URL format. Expected 'https://github.com/owner/repo'.")]
    InvalidUrl(String),

    #[error("Repository not found. It might be private or spelled incorrectly.")]
    NotFound,

    #[error("GitHub API rate limit exceeded. Please wait a moment and try again.")]
    RateLimit,

    #[error("Failed to fetch repository data (Status: {status}).")]
    HostingApi { status: u16 },

    #[error("Received an empty response from the AI model.")]
    EmptyGeneration,

    #[error("AI model request failed: {0}")]
    Generation(String),

    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("prompt error: {0}")]
    Prompt(#[from] readgen_pm::PmError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    NotFound,
    RateLimit,
    HostingApi,
    EmptyGeneration,
    Orchestration,
}

impl CoreError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::NotFound => ErrorKind::NotFound,
            Self::RateLimit => ErrorKind::RateLimit,
            Self::HostingApi { .. } => ErrorKind::HostingApi,
            Self::EmptyGeneration => ErrorKind::EmptyGeneration,
            _ => ErrorKind::Orchestration,
        }
    }

    /// Whether the same request may succeed if repeated later.
    ///
    /// Nothing in the pipeline retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::RateLimit | ErrorKind::EmptyGeneration)
    }
}
