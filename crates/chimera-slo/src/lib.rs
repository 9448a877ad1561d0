//! SLO tracker: a registry of [`Slo`] windows that reset on expiry and
//! accumulate total/failed observation counts.
//!
//! Distinct from [`chimera_types::Slo`] itself, which is the plain data
//! record; this crate is the service that mutates it over time.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

use chimera_types::Slo;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SloError {
    #[error("slo {0:?} is not registered")]
    Unregistered(String),

    #[error("slo {0:?} is already registered")]
    AlreadyRegistered(String),
}

/// Concurrent registry of named SLOs, each tracking its own resetting window.
pub struct SloTracker {
    slos: DashMap<String, Slo>,
}

impl SloTracker {
    pub fn new() -> Self {
        Self {
            slos: DashMap::new(),
        }
    }

    /// Register a new SLO. Errors if `name` is already registered; re-registering
    /// with different parameters must go through an explicit removal first.
    pub fn register(&self, name: impl Into<String>, target: f64, window_seconds: u64) -> Result<(), SloError> {
        let name = name.into();
        if self.slos.contains_key(&name) {
            return Err(SloError::AlreadyRegistered(name));
        }
        self.slos.insert(name.clone(), Slo::new(name, target, window_seconds));
        Ok(())
    }

    /// Record one observation against `name`'s current window, advancing the
    /// window first if it has expired relative to `now`.
    pub fn record(&self, name: &str, ok: bool, now: DateTime<Utc>) -> Result<(), SloError> {
        let mut entry = self
            .slos
            .get_mut(name)
            .ok_or_else(|| SloError::Unregistered(name.to_string()))?;

        let elapsed = (now - entry.window_start).num_seconds();
        if elapsed > entry.window_seconds as i64 {
            tracing::debug!(slo = name, elapsed, "slo window expired, resetting");
            entry.total_requests = 0;
            entry.failed_requests = 0;
            entry.window_start = now;
        }

        entry.total_requests += 1;
        if !ok {
            entry.failed_requests += 1;
        }
        Ok(())
    }

    /// A snapshot of `name`'s current state, if registered.
    pub fn snapshot(&self, name: &str) -> Option<Slo> {
        self.slos.get(name).map(|r| r.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.slos.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for SloTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn recording_against_unregistered_slo_fails_closed() {
        let tracker = SloTracker::new();
        let err = tracker.record("checkout", true, Utc::now()).unwrap_err();
        assert_eq!(err, SloError::Unregistered("checkout".to_string()));
    }

    #[test]
    fn counters_accumulate_within_the_window() {
        let tracker = SloTracker::new();
        tracker.register("checkout", 0.99, 3600).unwrap();
        let now = Utc::now();
        tracker.record("checkout", true, now).unwrap();
        tracker.record("checkout", false, now).unwrap();

        let slo = tracker.snapshot("checkout").unwrap();
        assert_eq!(slo.total_requests, 2);
        assert_eq!(slo.failed_requests, 1);
    }

    #[test]
    fn window_resets_once_expired() {
        let tracker = SloTracker::new();
        tracker.register("checkout", 0.99, 60).unwrap();
        let start = Utc::now();
        tracker.record("checkout", false, start).unwrap();

        let after_expiry = start + Duration::seconds(61);
        tracker.record("checkout", true, after_expiry).unwrap();

        let slo = tracker.snapshot("checkout").unwrap();
        assert_eq!(slo.total_requests, 1);
        assert_eq!(slo.failed_requests, 0);
        assert_eq!(slo.window_start, after_expiry);
    }

    #[test]
    fn registering_twice_is_rejected() {
        let tracker = SloTracker::new();
        tracker.register("checkout", 0.99, 60).unwrap();
        let err = tracker.register("checkout", 0.95, 30).unwrap_err();
        assert_eq!(err, SloError::AlreadyRegistered("checkout".to_string()));
    }
}
