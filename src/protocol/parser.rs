//! Incremental Request-Line Parser
//!
//! TCP is a stream, so a request line may arrive split across several reads.
//! The parser works on whatever has been buffered so far and returns either:
//! - `Ok(Some((request, consumed)))` - a complete line was parsed, `consumed` bytes were used
//! - `Ok(None)` - no line terminator yet, read more data
//! - `Err(ParseError)` - the line is malformed
//!
//! When the peer closes its write half without a terminator, the caller hands
//! the leftover bytes to [`RequestParser::parse_final`], which treats them as
//! the last line.

use crate::protocol::types::{LookupRequest, LF};
use thiserror::Error;

/// Errors that can occur while parsing a request line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The connection closed before any request bytes arrived
    #[error("connection closed before a request line was received")]
    NoRequest,

    /// The line contains no tokens
    #[error("empty request line")]
    EmptyLine,

    /// The length token is not a non-negative integer
    #[error("invalid minimum length: {0}")]
    InvalidLength(String),

    /// The line is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The line exceeds the maximum allowed size
    #[error("request line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size of a request line, terminator included (4 KB)
pub const MAX_LINE_SIZE: usize = 4 * 1024;

/// Parser for `<word> [<minLength>]` request lines.
///
/// # Example
///
/// ```
/// use anagramd::protocol::RequestParser;
///
/// let parser = RequestParser::new();
/// let (request, consumed) = parser.parse(b"listen 4\n").unwrap().unwrap();
/// assert_eq!(request.word, "listen");
/// assert_eq!(request.min_length, 4);
/// assert_eq!(consumed, 9);
/// ```
#[derive(Debug, Clone)]
pub struct RequestParser {
    max_line: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Creates a parser with the default line limit.
    pub fn new() -> Self {
        Self {
            max_line: MAX_LINE_SIZE,
        }
    }

    /// Creates a parser with a custom line limit.
    pub fn with_max_line(max_line: usize) -> Self {
        Self { max_line }
    }

    /// Attempts to parse one request line from the buffer.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(LookupRequest, usize)>> {
        match buf.iter().position(|&b| b == LF) {
            Some(pos) => {
                if pos + 1 > self.max_line {
                    return Err(ParseError::LineTooLong {
                        size: pos + 1,
                        max: self.max_line,
                    });
                }
                let request = parse_line(&buf[..pos])?;
                Ok(Some((request, pos + 1)))
            }
            None if buf.len() >= self.max_line => Err(ParseError::LineTooLong {
                size: buf.len(),
                max: self.max_line,
            }),
            None => Ok(None),
        }
    }

    /// Parses whatever is left in the buffer after the peer stopped sending.
    pub fn parse_final(&self, buf: &[u8]) -> ParseResult<LookupRequest> {
        if let Some((request, _)) = self.parse(buf)? {
            return Ok(request);
        }
        if buf.is_empty() {
            return Err(ParseError::NoRequest);
        }
        parse_line(buf)
    }
}

/// Parses a single line without its `\n` terminator.
///
/// The first token is the word, the optional second token the minimum length.
/// Anything after the second token is ignored.
pub fn parse_line(line: &[u8]) -> ParseResult<LookupRequest> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = std::str::from_utf8(line).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

    let mut tokens = text.split_whitespace();
    let word = tokens.next().ok_or(ParseError::EmptyLine)?;

    let min_length = match tokens.next() {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidLength(token.to_string()))?,
        None => 0,
    };

    Ok(LookupRequest::new(word, min_length))
}
