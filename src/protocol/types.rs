//! Lookup Protocol Data Types
//!
//! This module defines the two messages exchanged over a connection.
//! The protocol is plain UTF-8 text with one request and one response
//! per connection.
//!
//! ## Protocol Format
//!
//! Request: a single line of whitespace-separated tokens
//!
//! ```text
//! <word> [<minLength>]\n
//! ```
//!
//! Response: a text blob terminated by the server closing the connection.
//! It is one of:
//! - newline-joined matching anagrams
//! - an empty string (no matches)
//! - an error string starting with `Error: `
//!
//! ## Examples
//!
//! Request: `listen 4\n`
//! Response: `silent\nenlist\ntinsel\nisle\n`
//! Error response: `Error: API call failed\n`

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// The line terminator used by both request and response
pub const LF: u8 = b'\n';

/// Prefix every error response starts with
pub const ERROR_MARKER: &str = "Error: ";

/// A parsed lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// The word to resolve anagrams for, case-sensitive as received
    pub word: String,

    /// Only anagrams with at least this many characters are returned
    pub min_length: usize,
}

impl LookupRequest {
    /// Creates a new request.
    pub fn new(word: impl Into<String>, min_length: usize) -> Self {
        Self {
            word: word.into(),
            min_length,
        }
    }

    /// Serializes the request into its wire form, `<word> <minLength>\n`.
    ///
    /// # Example
    /// ```
    /// use anagramd::protocol::LookupRequest;
    /// let request = LookupRequest::new("listen", 4);
    /// assert_eq!(&request.serialize()[..], b"listen 4\n");
    /// ```
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.word.len() + 8);
        buf.put_slice(self.word.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.min_length.to_string().as_bytes());
        buf.put_u8(LF);
        buf.freeze()
    }
}

impl fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.word, self.min_length)
    }
}

/// The outcome of a lookup, as sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    /// Newline-joined matching anagrams in provider order. May be empty.
    Matches(String),

    /// The lookup failed. The message is written after [`ERROR_MARKER`].
    Error(String),
}

impl LookupResponse {
    /// Creates a match response by joining `words` with `\n`.
    pub fn matches<S: AsRef<str>>(words: &[S]) -> Self {
        let text = words
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        LookupResponse::Matches(text)
    }

    /// Creates an error response.
    pub fn error(msg: impl Into<String>) -> Self {
        LookupResponse::Error(msg.into())
    }

    /// Returns true if this response reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, LookupResponse::Error(_))
    }

    /// Renders the response text without a trailing line terminator.
    pub fn text(&self) -> String {
        match self {
            LookupResponse::Matches(text) => text.clone(),
            LookupResponse::Error(msg) => format!("{}{}", ERROR_MARKER, msg),
        }
    }

    /// Serializes the response for the wire: the text followed by `\n`.
    pub fn serialize(&self) -> Bytes {
        let text = self.text();
        let mut buf = BytesMut::with_capacity(text.len() + 1);
        buf.put_slice(text.as_bytes());
        buf.put_u8(LF);
        buf.freeze()
    }
}

impl fmt::Display for LookupResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
