//! Tamper-blind audit trail: every policy decision and use-case invocation
//! appends an [`AuditEntry`] to an in-memory ring buffer. Persistence is out
//! of scope for the core; a sink writing this to durable
//! storage is a `chimera-cli`/deployment concern.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Outcome of the audited operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditDecision {
    Allowed,
    Denied { reason: String },
    Completed,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub actor: String,
    pub operation: String,
    pub decision: AuditDecision,
}

impl AuditEntry {
    pub fn new(actor: impl Into<String>, operation: impl Into<String>, decision: AuditDecision) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            actor: actor.into(),
            operation: operation.into(),
            decision,
        }
    }
}

/// A bounded, thread-safe ring buffer of audit entries. Oldest entries are
/// dropped once `capacity` is reached.
pub struct AuditLog {
    capacity: usize,
    entries: Mutex<VecDeque<AuditEntry>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        tracing::debug!(operation = %entry.operation, actor = %entry.actor, "audit entry recorded");
        entries.push_back(entry);
    }

    /// The `n` most recent entries, newest last.
    pub fn recent(&self, n: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().unwrap();
        entries.iter().rev().take(n).rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_is_evicted_once_capacity_is_reached() {
        let log = AuditLog::new(2);
        log.record(AuditEntry::new("alice", "deploy", AuditDecision::Allowed));
        log.record(AuditEntry::new("bob", "rollback", AuditDecision::Allowed));
        log.record(AuditEntry::new("carol", "deploy", AuditDecision::Denied {
            reason: "no permission".into(),
        }));

        assert_eq!(log.len(), 2);
        let recent = log.recent(10);
        assert_eq!(recent[0].actor, "bob");
        assert_eq!(recent[1].actor, "carol");
    }

    #[test]
    fn recent_returns_newest_last() {
        let log = AuditLog::new(10);
        for actor in ["a", "b", "c"] {
            log.record(AuditEntry::new(actor, "op", AuditDecision::Completed));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].actor, "b");
        assert_eq!(recent[1].actor, "c");
    }
}
