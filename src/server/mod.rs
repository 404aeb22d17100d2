//! Broadcast server
//!
//! ```text
//!  accept ──► register ──► spawn watcher ──(EOF / read error)──► unregister
//!
//!  interval ──► generate ──► snapshot ──► send × N ──(failed / timed out)──► unregister
//! ```

pub mod broadcaster;
pub mod config;
pub mod listener;
pub mod watcher;

pub use broadcaster::{Broadcaster, TickOutcome};
pub use config::ServerConfig;
pub use listener::WeatherServer;
pub use watcher::{watch_disconnect, WatchExit};
