//! JSON bodies exchanged at the `/api/generate` boundary.

use serde::{Deserialize, Serialize};

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/generate";

/// Request body. `repo_url` is optional so a missing field can be reported
/// as a bad request instead of a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub repo_url: Option<String>,
}

/// Successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub readme: String,
}

/// Failure response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_use_camel_case_repo_url() {
        let req: GenerateRequest =
            serde_json::from_value(json!({ "repoUrl": "https://github.com/a/b" }))
                .expect("should parse");
        assert_eq!(req.repo_url.as_deref(), Some("https://github.com/a/b"));
    }

    #[test]
    fn test_should_accept_missing_repo_url() {
        let req: GenerateRequest = serde_json::from_value(json!({})).expect("should parse");
        assert!(req.repo_url.is_none());
    }
}
