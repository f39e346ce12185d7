//! Repository references parsed from user-supplied GitHub URLs.

use std::fmt;

use url::Url;

use crate::error::CoreError;

/// The only host accepted for repository URLs.
pub const GITHUB_HOST: &str = "github.com";

/// An `owner/name` pair identifying a GitHub repository.
///
/// Constructed only through [`RepositoryReference::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    owner: String,
    name: String,
}

impl RepositoryReference {
    /// Parse a repository URL such as `https://github.com/owner/repo`.
    ///
    /// Extra path segments (`/tree/main/src`) are ignored and a trailing
    /// `.git` is stripped from the repository name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidUrl` if the input is not a URL, the host is
    /// not `github.com`, or the path has fewer than two non-empty segments.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidUrl(input.to_owned());

        let url = Url::parse(input.trim()).map_err(|_| invalid())?;
        if url.host_str() != Some(GITHUB_HOST) {
            return Err(invalid());
        }

        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty());
        let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
            return Err(invalid());
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Returns the repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
