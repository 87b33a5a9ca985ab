//! Statistics for sessions and broadcasts

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::Delivery;

/// Outcome of a single `push`
///
/// Per-recipient failures are never errors; they are only counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Recipients whose mailbox accepted the message
    pub delivered: usize,
    /// Recipients whose mailbox was full (message dropped for them)
    pub dropped: usize,
    /// Recipients whose mailbox was already closed
    pub closed: usize,
}

impl PushOutcome {
    /// Record one delivery attempt
    pub fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Dropped => self.dropped += 1,
            Delivery::Closed => self.closed += 1,
        }
    }

    /// Number of recipients an attempt was made for
    pub fn attempted(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }
}

/// Session-level statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Registered clients (open or closed)
    pub client_count: usize,
    /// Registered clients whose mailbox is closed
    pub closed_clients: usize,
    /// Mailbox capacity for clients of this session
    pub max_queue_depth: usize,
    /// Total `push` calls
    pub pushes: u64,
    /// Total messages enqueued across all clients
    pub delivered: u64,
    /// Total messages dropped on full mailboxes
    pub dropped: u64,
}

/// Running broadcast counters kept by a session
#[derive(Debug, Default)]
pub(crate) struct PushCounters {
    pushes: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl PushCounters {
    pub(crate) fn add(&self, outcome: &PushOutcome) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
        self.dropped
            .fetch_add(outcome.dropped as u64, Ordering::Relaxed);
    }

    /// Fill the counter fields of a stats snapshot
    pub(crate) fn fill(&self, stats: &mut SessionStats) {
        stats.pushes = self.pushes.load(Ordering::Relaxed);
        stats.delivered = self.delivered.load(Ordering::Relaxed);
        stats.dropped = self.dropped.load(Ordering::Relaxed);
    }
}
