//! Weather broadcast server binary
//!
//! Run with: weathercast [--port 4000] [--period-secs 5] [--cities a,b,c]

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use weathercast::weather::{DEFAULT_CITIES, DEFAULT_CONDITIONS};
use weathercast::{RandomWeather, ServerConfig, WeatherConfig, WeatherServer};

#[derive(Debug, Parser)]
#[command(name = "weathercast", version, about = "Periodic weather broadcast server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "WEATHERCAST_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, short, env = "WEATHERCAST_PORT", default_value_t = 4000)]
    port: u16,

    /// Seconds between broadcasts
    #[arg(long, env = "WEATHERCAST_PERIOD_SECS", default_value_t = 5)]
    period_secs: u64,

    /// Per-subscriber write deadline in milliseconds
    #[arg(long, env = "WEATHERCAST_WRITE_TIMEOUT_MS", default_value_t = 2000)]
    write_timeout_ms: u64,

    /// Maximum concurrent subscribers (0 = unlimited)
    #[arg(long, env = "WEATHERCAST_MAX_CONNECTIONS", default_value_t = 0)]
    max_connections: usize,

    /// Comma-separated city list
    #[arg(long, env = "WEATHERCAST_CITIES", value_delimiter = ',')]
    cities: Vec<String>,

    /// Comma-separated condition list
    #[arg(long, env = "WEATHERCAST_CONDITIONS", value_delimiter = ',')]
    conditions: Vec<String>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig::with_addr(SocketAddr::new(self.bind, self.port))
            .broadcast_period(Duration::from_secs(self.period_secs))
            .write_timeout(Duration::from_millis(self.write_timeout_ms))
            .max_connections(self.max_connections)
    }

    fn weather_config(&self) -> WeatherConfig {
        let cities = non_empty_or(&self.cities, DEFAULT_CITIES);
        let conditions = non_empty_or(&self.conditions, DEFAULT_CONDITIONS);
        WeatherConfig::default().cities(cities).conditions(conditions)
    }
}

fn non_empty_or(values: &[String], defaults: &[&str]) -> Vec<String> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        defaults.iter().map(|d| d.to_string()).collect()
    } else {
        values
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "weathercast=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = args.server_config();
    let weather = args.weather_config();

    tracing::info!(
        addr = %config.bind_addr,
        period_secs = config.broadcast_period.as_secs(),
        cities = ?weather.cities,
        "Starting weather broadcast server"
    );

    let server = WeatherServer::with_generator(config, RandomWeather::new(weather));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match server.run_until(shutdown).await {
        Ok(()) => {
            let stats = server.stats().snapshot();
            tracing::info!(
                ticks = stats.ticks_completed,
                frames = stats.frames_delivered,
                "Server stopped"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
