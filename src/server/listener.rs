//! Weather broadcast server
//!
//! Handles the TCP accept loop, registers each connection and spawns its
//! disconnect watcher. The broadcaster runs alongside as its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::registry::SubscriberRegistry;
use crate::server::broadcaster::Broadcaster;
use crate::server::config::ServerConfig;
use crate::server::watcher::watch_disconnect;
use crate::stats::ServerStats;
use crate::weather::{RandomWeather, ReportGenerator};

/// Weather broadcast server
pub struct WeatherServer {
    config: ServerConfig,
    registry: Arc<SubscriberRegistry>,
    stats: Arc<ServerStats>,
    broadcaster: Broadcaster,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl WeatherServer {
    /// Create a server broadcasting random weather with the default value sets
    pub fn new(config: ServerConfig) -> Self {
        Self::with_generator(config, RandomWeather::default())
    }

    /// Create a server with a custom report generator
    pub fn with_generator<G: ReportGenerator>(config: ServerConfig, generator: G) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let registry = Arc::new(SubscriberRegistry::new());
        let stats = Arc::new(ServerStats::new());
        let broadcaster = Broadcaster::new(
            Arc::clone(&registry),
            Arc::new(generator),
            Arc::clone(&stats),
            config.broadcast_period,
            config.write_timeout,
        );

        Self {
            config,
            registry,
            stats,
            broadcaster,
            connection_semaphore,
        }
    }

    /// Get a reference to the subscriber registry
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Get a reference to the server counters
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Bind the listening socket
    ///
    /// A failure here is the only error that should end the process.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;

        let local = listener.local_addr().unwrap_or(addr);
        tracing::info!(addr = %local, "Weather server listening");
        Ok(listener)
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = self.bind().await?;

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve(listener) => result,
        }
    }

    /// Serve on an already-bound listener: broadcaster plus accept loop
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let broadcast_handle = self.broadcaster.spawn();
        let _guard = AbortOnDrop(broadcast_handle);

        self.accept_loop(&listener).await
    }

    /// Accept connections forever
    ///
    /// Accept errors are logged and the loop continues.
    pub async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.stats.connection_rejected();
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        // Configure socket
        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(peer = %peer_addr, error = %e, "Failed to configure socket");
            return;
        }

        let (reader, writer) = socket.into_split();
        let handle = self.registry.register(writer, Some(peer_addr)).await;
        self.stats.connection_accepted();

        let registry = Arc::clone(&self.registry);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let _permit = permit;
            watch_disconnect(handle, reader, registry, stats).await;
            tracing::debug!(peer = %peer_addr, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
