//! Weather subscriber
//!
//! Connection-level client: connect, optionally announce a city, then read
//! one report per broadcast.

use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::Result;
use crate::protocol::{read_frame, write_frame, ControlFrame};
use crate::weather::WeatherReport;

/// A connected subscriber
///
/// # Example
/// ```no_run
/// use weathercast::client::WeatherSubscriber;
///
/// # async fn example() -> weathercast::error::Result<()> {
/// let mut subscriber = WeatherSubscriber::connect("localhost:4000").await?;
/// subscriber.subscribe("Kandy").await?;
///
/// while let Some(report) = subscriber.next_report().await? {
///     println!("{}", report);
/// }
/// # Ok(())
/// # }
/// ```
pub struct WeatherSubscriber {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl WeatherSubscriber {
    /// Connect to a server
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr()?;

        tracing::debug!(server = %peer_addr, "Connected");
        Ok(Self { stream, peer_addr })
    }

    /// Server address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send `SUBSCRIBE:<city>`
    ///
    /// The server acknowledges nothing and keeps sending every report.
    pub async fn subscribe(&mut self, city: &str) -> Result<()> {
        self.send_control(&ControlFrame::Subscribe(city.to_string()))
            .await
    }

    /// Send `UNSUBSCRIBE`
    pub async fn unsubscribe(&mut self) -> Result<()> {
        self.send_control(&ControlFrame::Unsubscribe).await
    }

    /// Read the next raw frame; `None` once the server closes the connection
    pub async fn next_frame(&mut self) -> Result<Option<String>> {
        read_frame(&mut self.stream).await
    }

    /// Read and parse the next report; `None` once the server closes the
    /// connection
    pub async fn next_report(&mut self) -> Result<Option<WeatherReport>> {
        match self.next_frame().await? {
            Some(text) => Ok(Some(text.parse()?)),
            None => Ok(None),
        }
    }

    /// Unsubscribe and close the connection
    pub async fn close(mut self) -> Result<()> {
        // Best effort; the server may already be gone
        if let Err(e) = self.unsubscribe().await {
            tracing::debug!(error = %e, "Unsubscribe on close failed");
        }
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn send_control(&mut self, frame: &ControlFrame) -> Result<()> {
        write_frame(&mut self.stream, &frame.to_payload()).await
    }
}
