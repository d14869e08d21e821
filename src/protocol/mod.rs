//! Lookup Protocol Implementation
//!
//! This module implements the line-oriented text protocol spoken between
//! the client and the server.
//!
//! ## Overview
//!
//! One connection carries exactly one exchange: the client writes a request
//! line, the server writes a response blob and closes the connection. There
//! is no versioning and no framing beyond the line and connection boundaries.
//!
//! ## Modules
//!
//! - `types`: Defines `LookupRequest`, `LookupResponse` and their wire form
//! - `parser`: Incremental parser for incoming request lines
//!
//! ## Example
//!
//! ```
//! use anagramd::protocol::{LookupResponse, RequestParser};
//!
//! // Parsing incoming data
//! let (request, _consumed) = RequestParser::new().parse(b"listen 4\n").unwrap().unwrap();
//! assert_eq!(request.word, "listen");
//!
//! // Creating responses
//! let response = LookupResponse::matches(&["silent", "enlist"]);
//! assert_eq!(&response.serialize()[..], b"silent\nenlist\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_line, ParseError, ParseResult, RequestParser, MAX_LINE_SIZE};
pub use types::{LookupRequest, LookupResponse, ERROR_MARKER};
