//! Release metadata lookup.
//!
//! Resolving the `latest` version sentinel needs one query against the
//! upstream repository's "latest release" endpoint. The query sits behind
//! [`ReleaseLookup`] so version resolution can be tested without network
//! access.

use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Owner of the upstream hurl repository.
pub const UPSTREAM_OWNER: &str = "Orange-OpenSource";

/// Name of the upstream hurl repository.
pub const UPSTREAM_REPO: &str = "hurl";

/// Default REST API root for release metadata.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// User agent sent with every API request.
const USER_AGENT: &str = concat!("setup-hurl/", env!("CARGO_PKG_VERSION"));

/// Network timeout for metadata requests.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Query for the most recent release of a repository.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseLookup {
    /// Return the tag name of the latest release of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the response
    /// cannot be decoded.
    fn latest_tag(&self, owner: &str, repo: &str) -> Result<String, LookupError>;
}

/// Errors arising from release metadata lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The repository or its latest release does not exist (HTTP 404).
    #[error("no release found at {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The credential was missing, invalid, or rate limited (HTTP 401/403).
    #[error("request to {url} was rejected with status {status}; check the github token")]
    Unauthorized {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The response body was not the expected JSON document.
    #[error("unexpected release metadata from {url}: {reason}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// The subset of the release document this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag name (e.g. `5.0.0` or `v5.0.0`).
    pub tag_name: String,
}

/// Release lookup against the GitHub REST API using `ureq`.
#[derive(Debug, Clone)]
pub struct GithubReleaseLookup {
    api_url: String,
    token: Option<String>,
}

impl GithubReleaseLookup {
    /// Create a lookup against the public API, optionally authenticated.
    ///
    /// Empty tokens are treated as absent.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Create a lookup against an alternative API root (for example a
    /// GitHub Enterprise server).
    #[must_use]
    pub fn with_api_url(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Construct the latest-release endpoint URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use hurl_installer::release::GithubReleaseLookup;
    ///
    /// let lookup = GithubReleaseLookup::new(None);
    /// assert_eq!(
    ///     lookup.latest_release_url("Orange-OpenSource", "hurl"),
    ///     "https://api.github.com/repos/Orange-OpenSource/hurl/releases/latest"
    /// );
    /// ```
    #[must_use]
    pub fn latest_release_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases/latest", self.api_url)
    }

    /// Whether requests carry an authorization header.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl ReleaseLookup for GithubReleaseLookup {
    fn latest_tag(&self, owner: &str, repo: &str) -> Result<String, LookupError> {
        let url = self.latest_release_url(owner, repo);
        let mut request = http_agent()
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.call().map_err(|e| map_ureq_error(&url, &e))?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| LookupError::Http {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        parse_release(&url, &body).map(|release| release.tag_name)
    }
}

/// Decode a release document.
fn parse_release(url: &str, body: &str) -> Result<Release, LookupError> {
    serde_json::from_str(body).map_err(|e| LookupError::Decode {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(LOOKUP_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`LookupError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> LookupError {
    match err {
        ureq::Error::StatusCode(404) => LookupError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status @ (401 | 403)) => LookupError::Unauthorized {
            url: url.to_owned(),
            status: *status,
        },
        other => LookupError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
