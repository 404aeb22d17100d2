//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 4000;

/// Default time between broadcasts
pub const DEFAULT_BROADCAST_PERIOD: Duration = Duration::from_secs(5);

/// Default per-subscriber write deadline
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Time between broadcast ticks
    pub broadcast_period: Duration,

    /// Deadline for writing one frame to one subscriber
    pub write_timeout: Duration,

    /// Maximum concurrent subscribers (0 = unlimited)
    pub max_connections: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            broadcast_period: DEFAULT_BROADCAST_PERIOD,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_connections: 0, // Unlimited
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Keep the bind IP, change the port
    pub fn port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    /// Set the broadcast period
    ///
    /// A zero period is raised to one millisecond; the tick timer cannot
    /// fire on a zero interval.
    pub fn broadcast_period(mut self, period: Duration) -> Self {
        self.broadcast_period = period.max(Duration::from_millis(1));
        self
    }

    /// Set the per-subscriber write deadline
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 4000);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.broadcast_period, Duration::from_secs(5));
        assert_eq!(config.write_timeout, DEFAULT_WRITE_TIMEOUT);
        assert_eq!(config.max_connections, 0);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:4001".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.broadcast_period, DEFAULT_BROADCAST_PERIOD);
    }

    #[test]
    fn test_builder_port_keeps_ip() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::with_addr(addr).port(0);

        assert_eq!(config.bind_addr, "127.0.0.1:0".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_builder_zero_period_clamped() {
        let config = ServerConfig::default().broadcast_period(Duration::ZERO);

        assert_eq!(config.broadcast_period, Duration::from_millis(1));
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .broadcast_period(Duration::from_secs(1))
            .write_timeout(Duration::from_millis(250))
            .max_connections(50)
            .tcp_nodelay(false);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.broadcast_period, Duration::from_secs(1));
        assert_eq!(config.write_timeout, Duration::from_millis(250));
        assert_eq!(config.max_connections, 50);
        assert!(!config.tcp_nodelay);
    }
}
