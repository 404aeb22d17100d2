//! Subscriber handle
//!
//! A handle pairs a registry-assigned id with the write side of the
//! subscriber's transport. The read side stays with the disconnect watcher.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, Notify};

use crate::error::{Error, Result};
use crate::protocol::frame::write_encoded;

/// Boxed write half of a subscriber transport
pub type SubscriberWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Registry-assigned subscriber identity
///
/// Ids are allocated from a monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub(super) u64);

impl SubscriberId {
    /// Raw numeric id
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered subscriber connection
pub struct SubscriberHandle {
    id: SubscriberId,
    peer_addr: Option<SocketAddr>,
    writer: Mutex<SubscriberWriter>,
    closed: AtomicBool,
    close_notify: Notify,
}

impl SubscriberHandle {
    pub(super) fn new(
        id: SubscriberId,
        peer_addr: Option<SocketAddr>,
        writer: SubscriberWriter,
    ) -> Self {
        Self {
            id,
            peer_addr,
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
            close_notify: Notify::new(),
        }
    }

    /// Registry-assigned id
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remote address, if the transport has one
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Whether the handle has been removed from the registry
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Write an encoded frame, giving up after `deadline`
    ///
    /// Writes to one handle are serialized, so frames from consecutive ticks
    /// never interleave on the wire.
    pub async fn send(&self, frame: &[u8], deadline: Duration) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let write = async {
            let mut writer = self.writer.lock().await;
            write_encoded(&mut *writer, frame).await
        };

        match tokio::time::timeout(deadline, write).await {
            Ok(result) => result,
            Err(_) => Err(Error::WriteTimeout(deadline)),
        }
    }

    /// Wait until the handle is closed
    pub async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        self.close_notify.notified().await;
    }

    /// Mark closed and wake the watcher. Returns `false` if already closed.
    pub(super) fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        // notify_one stores a permit when the watcher is not parked yet
        self.close_notify.notify_one();
        true
    }
}

impl fmt::Debug for SubscriberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberHandle")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::{encode_frame, read_frame};

    fn handle_over_duplex(capacity: usize) -> (SubscriberHandle, tokio::io::DuplexStream) {
        let (local, remote) = tokio::io::duplex(capacity);
        let handle = SubscriberHandle::new(SubscriberId(7), None, Box::new(local));
        (handle, remote)
    }

    #[tokio::test]
    async fn test_send_delivers_frame() {
        let (handle, mut remote) = handle_over_duplex(256);
        let frame = encode_frame("hello").unwrap();

        handle.send(&frame, Duration::from_secs(1)).await.unwrap();

        assert_eq!(read_frame(&mut remote).await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_send_times_out_on_full_pipe() {
        // Nobody drains the remote side, so the write parks forever
        let (handle, _remote) = handle_over_duplex(4);
        let frame = encode_frame("a payload longer than four bytes").unwrap();

        let result = handle.send(&frame, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(Error::WriteTimeout(_))));
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let (handle, _remote) = handle_over_duplex(64);
        assert!(handle.close());

        let frame = encode_frame("late").unwrap();
        let result = handle.send(&frame, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn test_close_once() {
        let (handle, _remote) = handle_over_duplex(64);
        assert!(handle.close());
        assert!(!handle.close());
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_closed_resolves_after_close() {
        let (handle, _remote) = handle_over_duplex(64);
        let handle = std::sync::Arc::new(handle);

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.closed().await })
        };

        tokio::task::yield_now().await;
        handle.close();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("closed() did not resolve")
            .unwrap();
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SubscriberId(42).to_string(), "42");
        assert_eq!(SubscriberId(42).as_u64(), 42);
    }
}
