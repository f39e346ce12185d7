//! Shared helpers for outbound HTTP clients.

use anyhow::Context;
use url::Url;

use crate::error::CoreError;

/// Build the shared `reqwest` client.
///
/// GitHub rejects requests without a `User-Agent`. No timeout is set: every
/// call uses the platform default and is never retried.
pub(crate) fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("readgen/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Join an API base URL and a relative path.
///
/// Unlike [`Url::join`], a base with a path prefix (`https://host/api`) keeps
/// its prefix.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url, CoreError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let url = Url::parse(&raw).with_context(|| format!("invalid endpoint URL: {raw}"))?;
    Ok(url)
}
