//! Console weather subscriber
//!
//! Run with: cargo run --example console_subscriber [SERVER_ADDR] [CITY]
//!
//! Examples:
//!   cargo run --example console_subscriber                      # localhost:4000
//!   cargo run --example console_subscriber 127.0.0.1:4100
//!   cargo run --example console_subscriber localhost:4000 Kandy  # sends SUBSCRIBE:Kandy
//!
//! Prints every report until the server closes the connection or Ctrl+C.

use weathercast::WeatherSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weathercast=info".parse()?),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "localhost:4000".to_string());
    let city = std::env::args().nth(2);

    let mut subscriber = WeatherSubscriber::connect(addr.as_str()).await?;
    println!("Connected to {}", subscriber.peer_addr());

    if let Some(city) = city.as_deref().filter(|c| !c.trim().is_empty()) {
        subscriber.subscribe(city.trim()).await?;
    }

    loop {
        tokio::select! {
            report = subscriber.next_report() => match report {
                Ok(Some(report)) => println!("{}", report),
                Ok(None) => {
                    println!("[Connection closed]");
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("Read error: {}", e);
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nDisconnecting...");
                break;
            }
        }
    }

    subscriber.close().await?;
    Ok(())
}
