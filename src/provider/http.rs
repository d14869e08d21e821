//! HTTP Anagram Provider
//!
//! Issues one `GET` per fetch against a URL template such as
//! `http://www.anagramica.com/all/{word}` and expects a JSON object with the
//! candidates under `"all"`:
//!
//! ```text
//! {"all": ["silent", "enlist", "tinsel", "isle"]}
//! ```
//!
//! Anything else (non-2xx status, a different shape, transport failure) is a
//! [`FetchError`].
//!
//! `{word}` must be the template's last path segment. The word is appended
//! as a single percent-encoded segment, so `/`, `?` and `#` in a word never
//! change which resource is requested.

use crate::config::{ServerConfig, WORD_PLACEHOLDER};
use crate::provider::{AnagramProvider, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Shape of a provider reply.
#[derive(Debug, Deserialize)]
struct AnagramPayload {
    all: Vec<String>,
}

/// Provider backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    /// The endpoint with the placeholder segment removed
    base: Url,
}

impl HttpProvider {
    /// Creates a provider for `endpoint`, whose last path segment must be `{word}`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, None)
    }

    /// Creates a provider whose requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let endpoint = endpoint.into();
        let base = base_url(&endpoint)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// Creates a provider from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, FetchError> {
        Self::with_timeout(config.endpoint.clone(), config.fetch_timeout)
    }

    /// Builds the request URL for `word`.
    ///
    /// The word becomes one percent-encoded path segment. `.` and `..` are
    /// refused since a URL cannot carry them as a literal segment.
    pub fn url_for(&self, word: &str) -> Result<Url, FetchError> {
        if word == "." || word == ".." {
            return Err(FetchError::InvalidWord(word.to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl AnagramProvider for HttpProvider {
    async fn fetch(&self, word: &str) -> Result<Vec<String>, FetchError> {
        let url = self.url_for(word)?;
        debug!(url = %url, "Fetching anagrams");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(word = %word, status = %status, "Provider returned an error status");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        trace!(word = %word, body = %body, "Provider payload");

        let payload: AnagramPayload = serde_json::from_str(&body)?;
        Ok(payload.all)
    }
}

/// Parses an endpoint template into the URL the word segment is appended to.
fn base_url(endpoint: &str) -> Result<Url, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidEndpoint(format!("{}: {}", endpoint, reason));

    let prefix = endpoint
        .strip_suffix(WORD_PLACEHOLDER)
        .filter(|prefix| prefix.ends_with('/'))
        .ok_or_else(|| invalid(&format!("last path segment must be {}", WORD_PLACEHOLDER)))?;

    let base = Url::parse(prefix).map_err(|e| invalid(&e.to_string()))?;
    if base.cannot_be_a_base() || base.query().is_some() {
        return Err(invalid("not a hierarchical URL"));
    }
    Ok(base)
}
