//! # anagramd - A Cached Anagram Lookup Server
//!
//! anagramd answers anagram lookups over a plain TCP connection. A client
//! sends a word and a minimum length; the server resolves the word's anagrams
//! through an external HTTP provider, filters them by length, and writes the
//! matches back as newline-joined text. Repeated lookups of the same word
//! within the TTL (10 seconds by default) are served from memory.
//!
//! ## Features
//!
//! - **One Line In, One Blob Out**: `<word> [<minLength>]\n`, answered and closed
//! - **TTL Cache**: sharded `RwLock` cache with lazy expiry and a size bound
//! - **Background Sweeping**: stale entries are purged by a Tokio task
//! - **Async I/O**: every connection runs on its own Tokio task
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              anagramd                                   │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │   Server    │───>│ Connection  │───>│   Lookup    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──┬───────┬──┘                  │
//! │                                           │       │ miss / expired      │
//! │                                           ▼       ▼                     │
//! │  ┌─────────────┐    ┌────────────────────────┐ ┌──────────────────┐     │
//! │  │  Request    │    │       TtlCache         │ │  HttpProvider    │     │
//! │  │  Parser     │    │ ┌──────┐┌──────┐┌────┐ │ │  GET /all/{word} │     │
//! │  └─────────────┘    │ │Shard ││Shard ││... │ │ └──────────────────┘     │
//! │                     │ └──────┘└──────┘└────┘ │                          │
//! │                     └────────────────────────┘                          │
//! │                                 ▲                                       │
//! │                     ┌───────────┴───────────┐                           │
//! │                     │     CacheSweeper      │                           │
//! │                     └───────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use anagramd::{send_request, start_server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = start_server(7878).await?;
//!
//!     let matches = send_request("127.0.0.1", 7878, "listen", 5).await?;
//!     println!("{}", matches);
//!
//!     server.stop();
//!     server.wait().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: request-line parser and response rendering
//! - [`storage`]: thread-safe TTL cache and its sweeper
//! - [`provider`]: the external anagram source and length filter
//! - [`lookup`]: cache-then-provider resolution
//! - [`connection`]: per-connection request handling
//! - [`server`]: listener, accept loop, shutdown
//! - [`client`]: one-shot request sender
//! - [`config`]: settings and environment overrides

pub mod client;
pub mod config;
pub mod connection;
pub mod lookup;
pub mod protocol;
pub mod provider;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use client::{send_request, ClientError};
pub use config::{CacheConfig, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use connection::{handle_connection, ConnectionStats};
pub use lookup::LookupHandler;
pub use protocol::{LookupRequest, LookupResponse, ParseError, RequestParser};
pub use provider::{filter_by_length, AnagramProvider, FetchError, HttpProvider};
pub use server::{start_server, Server, ServerError, ServerHandle};
pub use storage::{AnagramCache, CacheSweeper, Lookup, TtlCache};

/// Version of anagramd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
