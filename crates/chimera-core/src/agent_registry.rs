//! Agent Registry: per-node health/drift records for fleet
//! queries. A pure data structure guarded for concurrent updates; it makes
//! no port calls of its own.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use chimera_types::{AgentHealth, AgentRecord, DriftReport, Node};

pub struct AgentRegistry {
    records: DashMap<Node, AgentRecord>,
    heartbeat_interval_seconds: u64,
}

impl AgentRegistry {
    pub fn new(heartbeat_interval_seconds: u64) -> Self {
        Self {
            records: DashMap::new(),
            heartbeat_interval_seconds,
        }
    }

    /// Record a heartbeat from `node`, creating its entry if this is the
    /// first contact.
    pub fn heartbeat(&self, node: Node, now: DateTime<Utc>) {
        self.records
            .entry(node.clone())
            .and_modify(|record| {
                record.last_heartbeat = now;
                record.health = AgentHealth::Healthy;
            })
            .or_insert_with(|| AgentRecord::new(node, now));
    }

    /// Record a drift observation for an already-known node. No-op if the
    /// node has never heartbeated.
    pub fn record_drift(&self, report: DriftReport) {
        if let Some(mut record) = self.records.get_mut(&report.node) {
            record.last_drift_report = Some(report);
        }
    }

    /// Recompute every entry's health against `now`, demoting nodes whose
    /// heartbeat is overdue.
    pub fn refresh_health(&self, now: DateTime<Utc>) {
        let unreachable_after = 3 * self.heartbeat_interval_seconds as i64;
        for mut entry in self.records.iter_mut() {
            let age_seconds = (now - entry.last_heartbeat).num_seconds();
            entry.health = if age_seconds > unreachable_after {
                AgentHealth::Unreachable
            } else if age_seconds > self.heartbeat_interval_seconds as i64 {
                AgentHealth::Degraded
            } else {
                AgentHealth::Healthy
            };
        }
    }

    pub fn query(&self, node: &Node) -> Option<AgentRecord> {
        self.records.get(node).map(|r| r.clone())
    }

    pub fn all(&self) -> Vec<AgentRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_types::{DriftSeverity, Fingerprint, SuggestedAction};
    use chrono::Duration;

    fn drift_report(node: Node) -> DriftReport {
        DriftReport {
            node,
            expected: Fingerprint::new("fp-expected").unwrap(),
            actual: None,
            severity: DriftSeverity::Low,
            blast_radius_pct: 0.0,
            suggested_action: SuggestedAction::RestartService,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn node_becomes_unreachable_after_three_missed_heartbeats() {
        let registry = AgentRegistry::new(5);
        let node = Node::parse("root@n1").unwrap();
        let start = Utc::now();
        registry.heartbeat(node.clone(), start);

        registry.refresh_health(start + Duration::seconds(16));
        assert_eq!(registry.query(&node).unwrap().health, AgentHealth::Unreachable);
    }

    #[test]
    fn node_is_degraded_between_one_and_three_intervals() {
        let registry = AgentRegistry::new(10);
        let node = Node::parse("root@n1").unwrap();
        let start = Utc::now();
        registry.heartbeat(node.clone(), start);

        registry.refresh_health(start + Duration::seconds(15));
        assert_eq!(registry.query(&node).unwrap().health, AgentHealth::Degraded);
    }

    #[test]
    fn drift_is_recorded_only_for_known_nodes() {
        let registry = AgentRegistry::new(5);
        let node = Node::parse("root@n1").unwrap();
        registry.record_drift(drift_report(node.clone()));
        assert!(registry.query(&node).is_none());

        registry.heartbeat(node.clone(), Utc::now());
        registry.record_drift(drift_report(node.clone()));
        assert!(registry.query(&node).unwrap().last_drift_report.is_some());
    }
}
