//! Caller-side request flow against a running readgen server.

use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::{ErrorResponse, GENERATE_PATH, GenerateRequest, GenerateResponse};
use crate::http::{build_client, endpoint};
use crate::types::GenerationResult;

/// Prefix every accepted repository URL must start with.
pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

const VALIDATION_MESSAGE: &str = "Please enter a valid GitHub repository URL.";
const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The URL failed the local check; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a failure status.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server URL: {0}")]
    InvalidServerUrl(String),
}

/// Submits repository URLs to a readgen server.
#[derive(Debug, Clone)]
pub struct ReadmeClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ReadmeClient {
    /// Create a client for the server at `server_url`, e.g. `http://127.0.0.1:3000`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidServerUrl` if the URL cannot be parsed and
    /// `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let endpoint = endpoint(server_url, GENERATE_PATH)
            .map_err(|_| ClientError::InvalidServerUrl(server_url.to_owned()))?;
        let http = build_client()?;
        Ok(Self { http, endpoint })
    }

    /// Request a README for `repo_url`.
    ///
    /// Performs a local shape check first, then sends exactly one request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty or non-GitHub URL,
    /// `ClientError::Server` with the server's message for a failure
    /// response, and `ClientError::Http` if the request cannot be completed.
    #[instrument(skip(self))]
    pub async fn submit(&self, repo_url: &str) -> Result<GenerationResult, ClientError> {
        validate_repo_url(repo_url)?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GenerateRequest {
                repo_url: Some(repo_url.to_owned()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());
            warn!(status = status.as_u16(), %message, "generation failed");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        debug!(bytes = body.readme.len(), "received README");
        Ok(GenerationResult {
            markdown: body.readme,
        })
    }
}

/// Local pre-check run before any network call.
///
/// # Errors
///
/// Returns `ClientError::Validation` if the URL is empty or does not start
/// with [`GITHUB_URL_PREFIX`].
pub fn validate_repo_url(repo_url: &str) -> Result<(), ClientError> {
    if repo_url.is_empty() || !repo_url.starts_with(GITHUB_URL_PREFIX) {
        return Err(ClientError::Validation(VALIDATION_MESSAGE.to_owned()));
    }
    Ok(())
}
