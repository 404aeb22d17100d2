//! Subscriber registry
//!
//! Tracks which subscriber connections the server currently believes are
//! writable.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<SubscriberRegistry>
//!                   ┌──────────────────────────┐
//!   [Listener] ───► │ subscribers: HashMap<    │ ◄─── unregister(id) ── [Watcher]
//!    register()     │   SubscriberId,          │
//!                   │   Arc<SubscriberHandle>  │ ◄─── unregister(id) ── [Broadcaster]
//!                   │ >                        │        (write failed)
//!                   └────────────┬─────────────┘
//!                                │ snapshot()
//!                                ▼
//!                  Vec<Arc<SubscriberHandle>>  ──► send(frame) ──► TCP
//! ```
//!
//! Removal is keyed by the id assigned at registration and is idempotent,
//! so the watcher and the broadcaster can race to remove the same
//! subscriber without double-closing it.

pub mod entry;
pub mod store;

pub use entry::{SubscriberHandle, SubscriberId, SubscriberWriter};
pub use store::SubscriberRegistry;
