//! Subscriber registry implementation
//!
//! The only shared mutable state in the server. Each operation takes the
//! lock once and releases it before returning; no network I/O happens while
//! the lock is held.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::sync::RwLock;

use super::entry::{SubscriberHandle, SubscriberId};

/// Registry of live subscribers
///
/// Thread-safe via `RwLock`. Snapshots take the read side, so concurrent
/// broadcasts never block each other; register and unregister take the
/// write side for a single map operation.
pub struct SubscriberRegistry {
    /// Map of subscriber id to handle
    subscribers: RwLock<HashMap<SubscriberId, Arc<SubscriberHandle>>>,

    /// Next id to hand out
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber transport
    ///
    /// Assigns a fresh id and returns the stored handle. The caller keeps the
    /// returned `Arc` only to learn the id and await [`SubscriberHandle::closed`].
    pub async fn register<W>(&self, writer: W, peer_addr: Option<SocketAddr>) -> Arc<SubscriberHandle>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = Arc::new(SubscriberHandle::new(id, peer_addr, Box::new(writer)));

        let count = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.insert(id, Arc::clone(&handle));
            subscribers.len()
        };

        tracing::info!(
            subscriber_id = %id,
            peer = ?peer_addr,
            subscribers = count,
            "Subscriber registered"
        );

        handle
    }

    /// Remove a subscriber
    ///
    /// Idempotent: the watcher and the broadcaster may both try to remove the
    /// same id. Only the first call closes the handle and returns `true`.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.subscribers.write().await;
            (subscribers.remove(&id), subscribers.len())
        };

        match removed {
            Some(handle) => {
                handle.close();
                tracing::info!(
                    subscriber_id = %id,
                    peer = ?handle.peer_addr(),
                    subscribers = count,
                    "Subscriber removed"
                );
                true
            }
            None => {
                tracing::trace!(subscriber_id = %id, "Subscriber already removed");
                false
            }
        }
    }

    /// Point-in-time copy of all handles, ordered by id
    ///
    /// The returned vector is detached from the registry; later registrations
    /// and removals do not affect it.
    pub async fn snapshot(&self) -> Vec<Arc<SubscriberHandle>> {
        let mut handles: Vec<_> = self.subscribers.read().await.values().cloned().collect();
        handles.sort_by_key(|h| h.id());
        handles
    }

    /// Whether `id` is currently registered
    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().await.contains_key(&id)
    }

    /// Number of registered subscribers
    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Whether no subscribers are registered
    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
