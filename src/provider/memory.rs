//! In-memory provider used by tests.

use crate::provider::{AnagramProvider, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Answers from a fixed table and counts how often it was asked.
#[derive(Debug, Default)]
pub(crate) struct MemoryProvider {
    answers: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashMap<String, u16>>,
    delay: Option<Duration>,
    calls: AtomicU64,
}

impl MemoryProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps this long first.
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn answer(self, word: &str, candidates: &[&str]) -> Self {
        self.answers.lock().unwrap().insert(
            word.to_string(),
            candidates.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Makes `word` fail with the given HTTP status.
    pub(crate) fn fail(self, word: &str, status: u16) -> Self {
        self.failing.lock().unwrap().insert(word.to_string(), status);
        self
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnagramProvider for MemoryProvider {
    async fn fetch(&self, word: &str) -> Result<Vec<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let status = self.failing.lock().unwrap().get(word).copied();
        if let Some(status) = status {
            let status = reqwest::StatusCode::from_u16(status).unwrap();
            return Err(FetchError::Status(status));
        }

        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(word)
            .cloned()
            .unwrap_or_default())
    }
}
