//! Server-wide counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters shared by the listener, watchers and broadcaster
#[derive(Debug)]
pub struct ServerStats {
    started_at: Instant,
    connections_accepted: AtomicU64,
    connections_rejected: AtomicU64,
    subscribers_removed: AtomicU64,
    ticks_completed: AtomicU64,
    ticks_skipped: AtomicU64,
    frames_delivered: AtomicU64,
    write_failures: AtomicU64,
    write_timeouts: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            connections_accepted: AtomicU64::new(0),
            connections_rejected: AtomicU64::new(0),
            subscribers_removed: AtomicU64::new(0),
            ticks_completed: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            frames_delivered: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            write_timeouts: AtomicU64::new(0),
        }
    }

    pub(crate) fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn subscriber_removed(&self) {
        self.subscribers_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tick_completed(&self, delivered: u64) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
        self.frames_delivered.fetch_add(delivered, Ordering::Relaxed);
    }

    pub(crate) fn tick_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write_failed(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write_timed_out(&self) {
        self.write_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed(),
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            subscribers_removed: self.subscribers_removed.load(Ordering::Relaxed),
            ticks_completed: self.ticks_completed.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            write_timeouts: self.write_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ServerStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Time since the stats were created
    pub uptime: Duration,
    /// Connections accepted and registered
    pub connections_accepted: u64,
    /// Connections refused by the connection limit
    pub connections_rejected: u64,
    /// Subscribers removed by either removal path
    pub subscribers_removed: u64,
    /// Ticks that produced a report and attempted delivery
    pub ticks_completed: u64,
    /// Ticks skipped because generation failed
    pub ticks_skipped: u64,
    /// Frames successfully written
    pub frames_delivered: u64,
    /// Writes that returned an error
    pub write_failures: u64,
    /// Writes that hit the deadline
    pub write_timeouts: u64,
}

impl StatsSnapshot {
    /// Subscribers currently connected, according to the counters
    pub fn active_subscribers(&self) -> u64 {
        self.connections_accepted
            .saturating_sub(self.subscribers_removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_stats_new() {
        let stats = ServerStats::new().snapshot();
        assert_eq!(stats.connections_accepted, 0);
        assert_eq!(stats.connections_rejected, 0);
        assert_eq!(stats.ticks_completed, 0);
        assert_eq!(stats.frames_delivered, 0);
        assert_eq!(stats.write_failures, 0);
        assert_eq!(stats.write_timeouts, 0);
    }

    #[test]
    fn test_tick_accumulates_frames() {
        let stats = ServerStats::new();
        stats.tick_completed(3);
        stats.tick_completed(2);
        stats.tick_skipped();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.ticks_completed, 2);
        assert_eq!(snapshot.ticks_skipped, 1);
        assert_eq!(snapshot.frames_delivered, 5);
    }

    #[test]
    fn test_active_subscribers() {
        let stats = ServerStats::new();
        for _ in 0..5 {
            stats.connection_accepted();
        }
        stats.subscriber_removed();
        stats.subscriber_removed();

        assert_eq!(stats.snapshot().active_subscribers(), 3);
    }
}
