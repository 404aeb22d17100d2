//! Disconnect watcher
//!
//! One task per subscriber. It reads inbound frames only to notice when the
//! peer goes away; control frames are logged and otherwise ignored.

use std::sync::Arc;

use tokio::io::AsyncRead;

use crate::protocol::{read_frame, ControlFrame};
use crate::registry::{SubscriberHandle, SubscriberRegistry};
use crate::stats::ServerStats;

/// Why a watcher stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// Peer closed the stream between frames
    PeerClosed,
    /// Read failed or the stream ended mid-frame
    ReadFailed,
    /// The handle was removed elsewhere (failed broadcast write)
    Removed,
}

/// Watch a subscriber's inbound side until it closes
///
/// Always ends with `unregister(id)`, which is a no-op if the broadcaster
/// already removed the subscriber. Dropping `reader` on return releases the
/// read half of the transport.
pub async fn watch_disconnect<R>(
    handle: Arc<SubscriberHandle>,
    mut reader: R,
    registry: Arc<SubscriberRegistry>,
    stats: Arc<ServerStats>,
) -> WatchExit
where
    R: AsyncRead + Unpin,
{
    let id = handle.id();

    let exit = loop {
        tokio::select! {
            _ = handle.closed() => break WatchExit::Removed,
            frame = read_frame(&mut reader) => match frame {
                Ok(Some(payload)) => match ControlFrame::parse(&payload) {
                    ControlFrame::Subscribe(city) => {
                        tracing::info!(subscriber_id = %id, city = %city, "Subscribe request (ignored)");
                    }
                    ControlFrame::Unsubscribe => {
                        tracing::info!(subscriber_id = %id, "Unsubscribe request (ignored)");
                    }
                    ControlFrame::Unknown(text) => {
                        tracing::info!(subscriber_id = %id, payload = %text, "Unrecognized frame from subscriber");
                    }
                },
                Ok(None) => break WatchExit::PeerClosed,
                Err(e) => {
                    tracing::debug!(subscriber_id = %id, error = %e, "Subscriber read failed");
                    break WatchExit::ReadFailed;
                }
            },
        }
    };

    if registry.unregister(id).await {
        stats.subscriber_removed();
    }

    tracing::debug!(subscriber_id = %id, reason = ?exit, "Watcher finished");
    exit
}
