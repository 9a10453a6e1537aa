//! Coordinator connects waiting for their name to be announced.
//!
//! A coordinator's Connect can arrive before the CoordinatorAdded event that
//! registers its name. Rather than spin until the name shows up, the request
//! is parked here with a deadline and resolved when a matching
//! CoordinatorAdded is processed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A parked coordinator connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConnect {
    pub name: String,
    pub requested_at: Instant,
    pub deadline: Instant,
}

impl PendingConnect {
    pub fn new(name: String, timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            name,
            requested_at: now,
            deadline: now + timeout,
        }
    }

    /// Check if the deadline has passed at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time spent waiting so far.
    pub fn waited(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.requested_at)
    }
}

/// Parked connects keyed by coordinator name.
#[derive(Debug, Default)]
pub struct PendingConnects {
    by_name: HashMap<String, PendingConnect>,
}

impl PendingConnects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a connect. A second connect for the same name keeps the
    /// original deadline.
    pub fn park(&mut self, name: String, timeout: Duration) {
        self.by_name
            .entry(name.clone())
            .or_insert_with(|| PendingConnect::new(name, timeout));
    }

    /// Take the pending connect for a name, if any.
    pub fn take(&mut self, name: &str) -> Option<PendingConnect> {
        self.by_name.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Drop every pending connect.
    pub fn clear(&mut self) {
        self.by_name.clear();
    }

    /// Remove and return requests whose deadline has passed at `now`.
    pub fn expire_at(&mut self, now: Instant) -> Vec<PendingConnect> {
        let expired: Vec<String> = self
            .by_name
            .iter()
            .filter(|(_, p)| p.is_expired_at(now))
            .map(|(name, _)| name.clone())
            .collect();

        expired
            .iter()
            .filter_map(|name| self.by_name.remove(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
