//! Anagram Provider Module
//!
//! The server does not know any anagrams itself. On a cache miss it asks an
//! external provider, which answers with the full list of candidates for a
//! word. Length filtering happens on our side so that one cached candidate
//! list can serve requests with different minimum lengths.
//!
//! ## Modules
//!
//! - `http`: the production provider, one HTTP GET per fetch
//!
//! ## Example
//!
//! ```
//! use anagramd::provider::filter_by_length;
//!
//! let candidates = vec!["silent".to_string(), "isle".to_string(), "lie".to_string()];
//! assert_eq!(filter_by_length(&candidates, 4), vec!["silent", "isle"]);
//! ```

pub mod http;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpProvider;

/// Errors that can occur while fetching candidates.
///
/// The `Display` form is what the client sees after the `Error: ` marker.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with a non-2xx status
    #[error("API call failed")]
    Status(reqwest::StatusCode),

    /// Network-level failure (DNS, refused connection, timeout, ...)
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The body was not an object holding an array of strings
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The word cannot be carried as a URL path segment
    #[error("invalid word: {0}")]
    InvalidWord(String),

    /// The endpoint template cannot produce a valid URL
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A source of anagram candidates.
///
/// Implementations must be cheap to share: one instance serves every
/// connection of a server.
#[async_trait]
pub trait AnagramProvider: Send + Sync {
    /// Fetches every candidate for `word`, in the provider's order.
    async fn fetch(&self, word: &str) -> Result<Vec<String>, FetchError>;
}

/// Keeps candidates with at least `min_length` characters.
///
/// Order is preserved and duplicates are kept. Length counts characters,
/// not bytes.
pub fn filter_by_length<S: AsRef<str>>(candidates: &[S], min_length: usize) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| candidate.chars().count() >= min_length)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_zero_keeps_everything() {
        let candidates = words(&["tinsel", "", "a", "silent", "a"]);
        assert_eq!(filter_by_length(&candidates, 0), candidates);
    }

    #[test]
    fn test_filter_is_inclusive() {
        let candidates = words(&["silent", "enlist", "tinsel", "isle"]);
        assert_eq!(
            filter_by_length(&candidates, 4),
            words(&["silent", "enlist", "tinsel", "isle"])
        );
        assert_eq!(
            filter_by_length(&candidates, 5),
            words(&["silent", "enlist", "tinsel"])
        );
    }

    #[test]
    fn test_filter_preserves_order_and_duplicates() {
        let candidates = words(&["stop", "po", "spot", "stop", "tops"]);
        assert_eq!(
            filter_by_length(&candidates, 4),
            words(&["stop", "spot", "stop", "tops"])
        );
    }

    #[test]
    fn test_filter_counts_characters() {
        // "été" is 3 characters but 5 bytes
        let candidates = words(&["été", "tee"]);
        assert_eq!(filter_by_length(&candidates, 4), Vec::<String>::new());
        assert_eq!(filter_by_length(&candidates, 3), words(&["été", "tee"]));
    }

    #[test]
    fn test_filter_everything_out() {
        let candidates = words(&["a", "ab"]);
        assert!(filter_by_length(&candidates, 10).is_empty());
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "API call failed");
    }
}
