//! Lookup Module
//!
//! This module sits between the connection layer and the storage/provider
//! layers. It receives parsed requests, consults the cache, falls back to the
//! provider, and returns the response to write.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ RequestParser   │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ LookupHandler   │  (this module)
//! └───┬─────────┬───┘
//!     │         │ miss / expired
//!     ▼         ▼
//! ┌────────┐ ┌──────────────────┐
//! │TtlCache│ │ AnagramProvider  │
//! └────────┘ └──────────────────┘
//! ```

pub mod handler;

pub use handler::LookupHandler;
