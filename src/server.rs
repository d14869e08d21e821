//! Server Module
//!
//! Owns the listening socket and the accept loop.
//!
//! ## Lifecycle
//!
//! ```text
//!   Stopped ──start()──> Listening ──stop()──> Stopped
//!              │
//!              └── bind fails ──> ServerError::Bind (no accept loop)
//! ```
//!
//! The accept loop runs on its own task and spawns one task per accepted
//! connection. `stop()`, or dropping the `ServerHandle`, ends the accept loop
//! and drops the listener; handlers already running are left to finish on
//! their own.

use crate::config::ServerConfig;
use crate::connection::{handle_connection, ConnectionStats};
use crate::lookup::LookupHandler;
use crate::provider::{AnagramProvider, FetchError, HttpProvider};
use crate::storage::{AnagramCache, CacheSweeper};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Errors that can occur while starting a server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The HTTP provider could not be built from the configuration
    #[error("provider setup failed: {0}")]
    Provider(#[from] FetchError),
}

/// Entry point for starting servers.
pub struct Server;

impl Server {
    /// Binds the listener and starts the accept loop.
    ///
    /// Returns once the socket is bound. A bind failure is returned here and
    /// no accept loop is started.
    pub async fn start(
        config: ServerConfig,
        provider: Arc<dyn AnagramProvider>,
    ) -> Result<ServerHandle, ServerError> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let cache = Arc::new(AnagramCache::new(config.cache.clone()));
        let stats = Arc::new(ConnectionStats::new());
        let lookup = LookupHandler::new(Arc::clone(&cache), provider);

        let sweeper = config
            .sweep_interval
            .map(|interval| CacheSweeper::start(Arc::clone(&cache), interval));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            lookup,
            Arc::clone(&stats),
            shutdown_rx,
        ));

        info!(addr = %local_addr, ttl_ms = config.cache.ttl.as_millis() as u64, "Listening");

        Ok(ServerHandle {
            local_addr,
            cache,
            stats,
            shutdown_tx,
            accept_task,
            _sweeper: sweeper,
        })
    }
}

/// Starts a server on `port` with default settings and the HTTP provider.
pub async fn start_server(port: u16) -> Result<ServerHandle, ServerError> {
    let config = ServerConfig::with_port(port);
    let provider = Arc::new(HttpProvider::from_config(&config)?);
    Server::start(config, provider).await
}

/// A handle to a running server.
///
/// The server lives as long as its handle. Dropping the handle stops it the
/// same way [`ServerHandle::stop`] does.
#[must_use = "dropping the handle stops the server"]
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    cache: Arc<AnagramCache>,
    stats: Arc<ConnectionStats>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
    _sweeper: Option<CacheSweeper>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The port the listener is bound to.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// The cache shared by this server's connections.
    pub fn cache(&self) -> &Arc<AnagramCache> {
        &self.cache
    }

    /// Connection statistics.
    pub fn stats(&self) -> &Arc<ConnectionStats> {
        &self.stats
    }

    /// Returns true while the accept loop is running.
    pub fn is_listening(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.accept_task.is_finished()
    }

    /// Stops accepting connections. Calling it more than once is harmless.
    pub fn stop(&self) {
        if !*self.shutdown_tx.borrow() {
            let _ = self.shutdown_tx.send(true);
            info!(addr = %self.local_addr, "Stopping server");
        }
    }

    /// Waits for the accept loop to exit.
    ///
    /// The listening socket is closed once this returns.
    pub async fn wait(self) {
        if let Err(e) = self.accept_task.await {
            error!(error = %e, "Accept loop panicked");
        }
    }
}

/// Accepts connections until shutdown is signalled.
async fn accept_loop(
    listener: TcpListener,
    lookup: LookupHandler,
    stats: Arc<ConnectionStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            result = shutdown_rx.changed() => match result {
                Ok(()) if !*shutdown_rx.borrow() => {}
                Ok(()) => break,
                Err(_) => {
                    debug!("Server handle dropped");
                    break;
                }
            },
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!(client = %addr, "Accepted connection");
                    let lookup = lookup.clone();
                    let stats = Arc::clone(&stats);

                    tokio::spawn(async move {
                        handle_connection(stream, addr, lookup, stats).await;
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
        }
    }

    drop(listener);
    info!("Accept loop stopped");
}
