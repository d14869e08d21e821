//! Configuration Module
//!
//! Holds the server and cache settings and loads overrides from environment
//! variables. The binary layers command-line flags on top of this.

use std::env;
use std::time::Duration;

/// Default port the server listens on
pub const DEFAULT_PORT: u16 = 7878;

/// Default host the server binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default provider endpoint. The trailing `{word}` segment is replaced with
/// the percent-encoded requested word.
pub const DEFAULT_ENDPOINT: &str = "http://www.anagramica.com/all/{word}";

/// Placeholder substituted in the endpoint template
pub const WORD_PLACEHOLDER: &str = "{word}";

/// Default time-to-live of a cached lookup (10 seconds)
pub const DEFAULT_TTL: Duration = Duration::from_millis(10_000);

/// Cache sizing and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a fetched result is served from the cache
    pub ttl: Duration,
    /// Upper bound on cached words (rounded up to a multiple of `shards`)
    pub max_entries: usize,
    /// Number of independently locked shards
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: 10_000,
            shards: 16,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on; 0 picks a free port
    pub port: u16,
    /// Provider URL template ending in a `/{word}` path segment
    pub endpoint: String,
    /// Timeout for one provider request (None = wait indefinitely)
    pub fetch_timeout: Option<Duration>,
    /// Cache settings
    pub cache: CacheConfig,
    /// Interval of the background sweeper (None = lazy expiry only)
    pub sweep_interval: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fetch_timeout: None,
            cache: CacheConfig::default(),
            sweep_interval: Some(crate::storage::DEFAULT_SWEEP_INTERVAL),
        }
    }
}

impl ServerConfig {
    /// Creates a default configuration listening on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `ANAGRAMD_HOST` - Bind host (default: 127.0.0.1)
    /// - `ANAGRAMD_PORT` - Listen port (default: 7878)
    /// - `ANAGRAMD_ENDPOINT` - Provider URL template (default: anagramica)
    /// - `ANAGRAMD_TTL_MS` - Cache TTL in milliseconds (default: 10000)
    /// - `ANAGRAMD_MAX_ENTRIES` - Cache capacity (default: 10000)
    /// - `ANAGRAMD_FETCH_TIMEOUT_MS` - Provider request timeout (default: none)
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("ANAGRAMD_HOST").unwrap_or(defaults.host),
            port: parse_env("ANAGRAMD_PORT").unwrap_or(defaults.port),
            endpoint: env::var("ANAGRAMD_ENDPOINT").unwrap_or(defaults.endpoint),
            fetch_timeout: parse_env("ANAGRAMD_FETCH_TIMEOUT_MS")
                .map(Duration::from_millis)
                .or(defaults.fetch_timeout),
            cache: CacheConfig {
                ttl: parse_env("ANAGRAMD_TTL_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.cache.ttl),
                max_entries: parse_env("ANAGRAMD_MAX_ENTRIES")
                    .unwrap_or(defaults.cache.max_entries),
                ..defaults.cache
            },
            sweep_interval: defaults.sweep_interval,
        }
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
