//! Storage Module
//!
//! This module provides the TTL cache that fronts the anagram provider,
//! plus a background sweeper that reclaims stale entries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TtlCache                             │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...N     │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │      CacheSweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: independent shards reduce lock contention
//! - **RwLock**: Multiple concurrent readers, exclusive writers
//! - **Lazy Expiry**: staleness is decided on read (`Hit` / `Miss` / `Expired`)
//! - **Bounded Size**: a full shard drops stale entries, then its oldest entry
//! - **Active Expiry**: the sweeper purges stale entries nobody asks for again

pub mod engine;
pub mod expiry;

// Re-export commonly used types
pub use engine::{CacheEntry, CacheStats, Lookup, TtlCache};
pub use expiry::{CacheSweeper, DEFAULT_SWEEP_INTERVAL};

/// The cache shared by every connection of one server.
///
/// Keyed by word; the value is the response text computed by the request
/// that filled the entry.
pub type AnagramCache = TtlCache<String>;
