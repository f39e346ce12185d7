//! Gemini `generateContent` client.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::GeminiConfig;
use crate::error::CoreError;
use crate::http::{build_client, endpoint};
use crate::types::GenerationPrompt;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini text generation API.
///
/// Each call sends one request with the configured sampling settings and
/// returns the concatenated text of the first candidate.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate; empty if none.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

impl GeminiClient {
    /// Create a client from the Gemini settings and an API key.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            http: build_client()?,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
        })
    }

    /// Returns the model name requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a prompt and return the raw generated text.
    ///
    /// The text may be empty; callers decide how to treat that.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Generation` for a non-success response and
    /// `CoreError::Http` if the request fails or the body is malformed.
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, CoreError> {
        let url = endpoint(
            &self.api_url,
            &format!("v1beta/models/{}:generateContent", self.model),
        )?;
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: prompt.as_str(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
            },
        };

        debug!(prompt_len = prompt.as_str().len(), "sending generation request");
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body_text)
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
            error!(status = status.as_u16(), %message, "generation request failed");
            return Err(CoreError::Generation(message));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text();
        debug!(text_len = text.len(), "received generation response");
        Ok(text)
    }
}

/// Pull `error.message` (or a top-level `message`) out of an error body.
fn extract_error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| parsed.get("message"))
        .and_then(|m| m.as_str())
        .map(ToOwned::to_owned)
}
