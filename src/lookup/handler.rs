//! Lookup Handler
//!
//! Resolves one request against the cache and, on a miss, the provider.
//!
//! ## Flow
//!
//! ```text
//! LookupRequest { word, min_length }
//!        │
//!        ▼
//!   cache.lookup(word) ── Hit ──────────────────────┐
//!        │                                           │
//!   Miss / Expired                                   │
//!        │                                           │
//!        ▼                                           │
//!   provider.fetch(word) ── Err ──> Error(..)        │
//!        │                                           │
//!        ▼                                           │
//!   filter_by_length(candidates, min_length)         │
//!        │                                           │
//!        ▼                                           ▼
//!   cache.store(word, text, now) ──────────────> Matches(text)
//! ```
//!
//! The cached value is the response text of the request that filled the
//! entry. Until it expires, every request for that word gets the same text,
//! whatever its minimum length. Failed fetches are never cached. Two
//! concurrent misses on the same word both reach the provider; the later
//! store wins.

use crate::protocol::{LookupRequest, LookupResponse};
use crate::provider::{filter_by_length, AnagramProvider, FetchError};
use crate::storage::{AnagramCache, Lookup};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resolves lookups for every connection of a server.
///
/// Cloning is cheap; all clones share the same cache and provider.
#[derive(Clone)]
pub struct LookupHandler {
    cache: Arc<AnagramCache>,
    provider: Arc<dyn AnagramProvider>,
}

impl std::fmt::Debug for LookupHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupHandler")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl LookupHandler {
    /// Creates a new handler over the given cache and provider.
    pub fn new(cache: Arc<AnagramCache>, provider: Arc<dyn AnagramProvider>) -> Self {
        Self { cache, provider }
    }

    /// The cache this handler reads and fills.
    pub fn cache(&self) -> &Arc<AnagramCache> {
        &self.cache
    }

    /// Executes a request and returns the response to send back.
    ///
    /// Never fails: a fetch failure becomes an `Error` response.
    pub async fn execute(&self, request: &LookupRequest) -> LookupResponse {
        match self.resolve(request).await {
            Ok(text) => LookupResponse::Matches(text),
            Err(e) => {
                warn!(word = %request.word, error = %e, "Anagram fetch failed");
                LookupResponse::Error(e.to_string())
            }
        }
    }

    /// Returns the response text for `request`, fetching on miss or expiry.
    pub async fn resolve(&self, request: &LookupRequest) -> Result<String, FetchError> {
        let word = request.word.as_str();
        let lookup = self.cache.lookup(word);
        debug!(word = %word, outcome = lookup.outcome(), "Cache lookup");

        match lookup {
            Lookup::Hit(text) => return Ok(text),
            Lookup::Expired => info!(word = %word, "Cache entry expired, refetching"),
            Lookup::Miss => {}
        }

        let candidates = self.provider.fetch(word).await?;
        let text = filter_by_length(&candidates, request.min_length).join("\n");
        self.cache.store(word, text.clone(), Instant::now());

        Ok(text)
    }
}
