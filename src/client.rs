//! Client Module
//!
//! One-shot lookups against a running server: connect, write one request
//! line, read until the server closes the connection.
//!
//! The call is an `async fn`, so callers that must stay responsive can
//! `tokio::spawn` it and receive the result through the join handle.

use crate::protocol::LookupRequest;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// Shown in place of an empty response
pub const NO_RESPONSE: &str = "No response";

/// Errors that can occur while sending a request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server could not be reached
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The connection failed mid-exchange
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Sends one lookup and returns the response text.
///
/// The response has its trailing line terminator removed. An empty response
/// is reported as [`NO_RESPONSE`]. Nothing is retried.
///
/// # Example
///
/// ```ignore
/// let text = anagramd::client::send_request("127.0.0.1", 7878, "listen", 4).await?;
/// println!("{}", text);
/// ```
pub async fn send_request(
    address: &str,
    port: u16,
    word: &str,
    min_length: usize,
) -> Result<String, ClientError> {
    let addr = format!("{}:{}", address, port);
    let mut stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let request = LookupRequest::new(word, min_length);
    debug!(server = %addr, request = %request, "Sending lookup");
    stream.write_all(&request.serialize()).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    trace!(server = %addr, bytes = raw.len(), "Received response");

    let body = String::from_utf8_lossy(&raw);
    let text = body.strip_suffix('\n').unwrap_or(&body);

    if text.is_empty() {
        Ok(NO_RESPONSE.to_string())
    } else {
        Ok(text.to_string())
    }
}
