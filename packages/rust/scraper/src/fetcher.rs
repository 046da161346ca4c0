//! Single-shot HTTP fetcher.
//!
//! One GET per call, no retries. Failures come back as [`FetchError`] for
//! the caller to log and absorb.

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use vilabot_shared::{HttpConfig, Result, VilabotError};

/// Why a fetch produced no markup.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("{url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The response body could not be read as text.
    #[error("{url}: body read failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } | Self::Body { source, .. } => source.is_timeout(),
            Self::Status { .. } => false,
        }
    }
}

impl From<FetchError> for VilabotError {
    fn from(err: FetchError) -> Self {
        VilabotError::Network(err.to_string())
    }
}

/// HTTP client wrapper shared by every source of one aggregate call.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a client with the configured identity, timeout and redirect policy.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout())
            .build()
            .map_err(|e| VilabotError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and return the body of a 2xx response.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        debug!("fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
