//! Connection Handler Module
//!
//! Each accepted client gets its own handler task. A connection carries
//! exactly one request: the handler reads a line, resolves it, writes the
//! response, and closes the connection.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. Read until one line is buffered ──(closed early / malformed)──┐
//!        │                                                        │
//!        ▼                                                        │
//! 4. Resolve through LookupHandler                                │
//!        │                                                        │
//!        ▼                                                        │
//! 5. Write response, shut down write half                         │
//!        │                                                        │
//!        ▼                                                        ▼
//! 6. Handler task ends                      error logged, connection dropped
//! ```
//!
//! Failures never leave the handler: they are logged and the connection is
//! closed. A malformed line still gets a best-effort `Error: ...` reply.

use crate::lookup::LookupHandler;
use crate::protocol::{LookupRequest, LookupResponse, ParseError, RequestParser};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 512;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Requests that got a response written
    pub requests_served: AtomicU64,
    /// Responses that reported a fetch failure
    pub fetch_failures: AtomicU64,
    /// Connections that ended on a malformed or missing request
    pub parse_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_served(&self, response: &LookupResponse) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        if response.is_error() {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for the incoming request line
    buffer: BytesMut,

    /// Resolves requests (shared across connections)
    lookup: LookupHandler,

    parser: RequestParser,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The TCP stream for this connection
    /// * `addr` - The client's socket address
    /// * `lookup` - The lookup handler shared by all connections
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        lookup: LookupHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            lookup,
            parser: RequestParser::new(),
            stats,
        }
    }

    /// Serves the connection's single request and closes it.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.addr, "Client connected");

        let result = self.serve().await;

        match &result {
            Ok(()) => trace!(client = %self.addr, "Connection closed"),
            Err(ConnectionError::Parse(ParseError::NoRequest)) => {
                debug!(client = %self.addr, "Client disconnected without a request")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// Read, resolve, respond.
    async fn serve(&mut self) -> Result<(), ConnectionError> {
        let request = match self.read_request().await {
            Ok(request) => request,
            Err(ConnectionError::Parse(e)) => {
                self.stats.parse_error();
                if e != ParseError::NoRequest {
                    // Best effort: the client may already be gone
                    let reply = LookupResponse::error(e.to_string());
                    let _ = self.send_response(&reply).await;
                }
                return Err(ConnectionError::Parse(e));
            }
            Err(e) => return Err(e),
        };

        info!(client = %self.addr, word = %request.word, min_length = request.min_length, "Lookup request");

        let response = self.lookup.execute(&request).await;
        self.send_response(&response).await?;
        self.stats.request_served(&response);

        Ok(())
    }

    /// Reads until one request line is buffered or the peer stops sending.
    async fn read_request(&mut self) -> Result<LookupRequest, ConnectionError> {
        loop {
            if let Some((request, consumed)) = self.parser.parse(&self.buffer)? {
                trace!(client = %self.addr, consumed = consumed, "Parsed request line");
                return Ok(request);
            }

            if self.buffer.capacity() - self.buffer.len() < 128 {
                self.buffer.reserve(INITIAL_BUFFER_SIZE);
            }

            let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Peer closed its write half; whatever is buffered is the line
                return Ok(self.parser.parse_final(&self.buffer)?);
            }

            self.stats.bytes_read(n);
            trace!(client = %self.addr, bytes = n, "Read data");
        }
    }

    /// Writes the response and closes our side of the connection.
    async fn send_response(&mut self, response: &LookupResponse) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed request line
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors have already been logged by the
/// handler and are dropped here.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    lookup: LookupHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, lookup, stats);
    let _ = handler.run().await;
}
