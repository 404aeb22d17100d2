//! Periodic broadcaster
//!
//! Each tick runs `Generating -> Snapshotting -> Delivering` to completion
//! before the timer is polled again, so ticks never overlap. A tick that is
//! due while the previous one is still delivering waits for it
//! ([`MissedTickBehavior::Delay`]).
//!
//! Delivery writes the same encoded frame to every handle in the snapshot
//! concurrently, each bounded by the write deadline. Failed handles are
//! collected and removed only after every write has finished.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::error::{Error, Result};
use crate::protocol::encode_frame;
use crate::registry::{SubscriberId, SubscriberRegistry};
use crate::stats::ServerStats;
use crate::weather::{ReportGenerator, WeatherReport};

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A report was generated and delivery was attempted
    Delivered {
        /// The broadcast report
        report: WeatherReport,
        /// Subscribers that received the frame
        delivered: usize,
        /// Subscribers removed because their write failed or timed out
        removed: Vec<SubscriberId>,
    },
    /// The generator failed; nothing was sent
    Skipped,
}

/// Drives periodic broadcasts
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
    generator: Arc<dyn ReportGenerator>,
    stats: Arc<ServerStats>,
    period: Duration,
    write_timeout: Duration,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        generator: Arc<dyn ReportGenerator>,
        stats: Arc<ServerStats>,
        period: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            generator,
            stats,
            period,
            write_timeout,
        }
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one broadcast
    pub async fn tick(&self) -> TickOutcome {
        // Generating
        let (report, frame) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                self.stats.tick_skipped();
                tracing::error!(error = %e, "Skipping tick: could not produce a report");
                return TickOutcome::Skipped;
            }
        };

        // Snapshotting
        let snapshot = self.registry.snapshot().await;

        // Delivering
        let mut writes = JoinSet::new();
        for handle in snapshot {
            let frame = frame.clone();
            let deadline = self.write_timeout;
            writes.spawn(async move {
                let result = handle.send(&frame, deadline).await;
                (handle, result)
            });
        }

        let mut delivered = 0;
        let mut failed = Vec::new();
        while let Some(joined) = writes.join_next().await {
            let (handle, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "Delivery task failed");
                    continue;
                }
            };

            match result {
                Ok(()) => delivered += 1,
                // Removed by its watcher after the snapshot was taken
                Err(Error::Closed) => {}
                Err(Error::WriteTimeout(deadline)) => {
                    self.stats.write_timed_out();
                    tracing::warn!(
                        subscriber_id = %handle.id(),
                        peer = ?handle.peer_addr(),
                        deadline_ms = deadline.as_millis() as u64,
                        "Write deadline exceeded"
                    );
                    failed.push(handle.id());
                }
                Err(e) => {
                    self.stats.write_failed();
                    tracing::warn!(
                        subscriber_id = %handle.id(),
                        peer = ?handle.peer_addr(),
                        error = %e,
                        "Write failed"
                    );
                    failed.push(handle.id());
                }
            }
        }

        failed.sort();
        for id in &failed {
            if self.registry.unregister(*id).await {
                self.stats.subscriber_removed();
            }
        }

        self.stats.tick_completed(delivered as u64);
        tracing::info!(report = %report, "Broadcasted");
        tracing::debug!(delivered, removed = failed.len(), "Tick complete");

        TickOutcome::Delivered {
            report,
            delivered,
            removed: failed,
        }
    }

    /// Run ticks forever, the first one immediately
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_ms = self.period.as_millis() as u64, "Broadcaster started");

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Spawn [`run`](Self::run) as a background task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn(&self) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move { broadcaster.run().await })
    }

    fn prepare(&self) -> Result<(WeatherReport, Bytes)> {
        let report = self.generator.generate()?;
        let frame = encode_frame(&report.to_payload())?;
        Ok((report, frame))
    }
}
