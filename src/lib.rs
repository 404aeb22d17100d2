//! Real-time weather broadcast server
//!
//! A single producer generates a [`WeatherReport`] on a fixed period and the
//! server fans it out to every connected subscriber over long-lived TCP
//! connections, one length-prefixed frame per tick.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use weathercast::{ServerConfig, WeatherServer};
//!
//! # async fn example() -> weathercast::error::Result<()> {
//! let config = ServerConfig::default().broadcast_period(Duration::from_secs(5));
//! let server = WeatherServer::new(config);
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod stats;
pub mod weather;

pub use client::WeatherSubscriber;
pub use error::{Error, Result};
pub use registry::{SubscriberHandle, SubscriberId, SubscriberRegistry};
pub use server::{Broadcaster, ServerConfig, TickOutcome, WeatherServer};
pub use stats::{ServerStats, StatsSnapshot};
pub use weather::{RandomWeather, ReportGenerator, WeatherConfig, WeatherReport};
