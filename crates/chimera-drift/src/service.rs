//! Drift Detection Service: concurrent congruence fan-out over a node set.

use crate::classify::{blast_radius_pct, classify_severity};
use crate::history::DriftHistory;
use crate::plan::HealingPlan;
use chimera_ports::RemoteExecutorPort;
use chimera_types::{CongruenceReport, DriftReport, Fingerprint, Node};
use futures::future::join_all;
use std::collections::HashSet;

/// Detects drift across `nodes` against `expected`, classifying each
/// non-congruent node's severity using `history` and the `production`
/// node-tag set, and returns the resulting healing plan.
///
/// Fetch failures surface as `unreachable` congruence reports: they count
/// toward blast radius but are otherwise treated like any other drift.
pub async fn detect(
    executor: &dyn RemoteExecutorPort,
    nodes: &[Node],
    expected: &Fingerprint,
    history: &DriftHistory,
    production: &HashSet<Node>,
) -> HealingPlan {
    let reports: Vec<CongruenceReport> = join_all(nodes.iter().map(|node| async move {
        let actual = executor.current_fingerprint(node).await.unwrap_or(None);
        CongruenceReport::observe(node.clone(), expected.clone(), actual)
    }))
    .await;

    let total = reports.len();
    let non_congruent = reports.iter().filter(|r| !r.is_congruent).count();
    let blast_radius = blast_radius_pct(non_congruent, total);

    let drift_reports: Vec<DriftReport> = reports
        .into_iter()
        .filter_map(|r| {
            let consecutive = history.record(&r.node, r.is_congruent);
            if r.is_congruent {
                return None;
            }
            let is_production = production.contains(&r.node);
            let severity = classify_severity(is_production, consecutive);
            Some(DriftReport {
                node: r.node,
                expected: r.expected,
                actual: r.actual,
                severity,
                blast_radius_pct: blast_radius,
                suggested_action: severity.suggested_action(),
                detected_at: chrono::Utc::now(),
            })
        })
        .collect();

    HealingPlan::from_reports(drift_reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_ports::fakes::FakeRemoteExecutorPort;
    use chimera_types::DriftSeverity;

    #[tokio::test]
    async fn unreachable_node_counts_toward_blast_radius() {
        let executor = FakeRemoteExecutorPort::new();
        let n1 = Node::parse("root@n1").unwrap();
        let n2 = Node::parse("root@n2").unwrap();
        let expected = Fingerprint::new("fp-AAA").unwrap();
        executor.seed(&n1, expected.clone());
        executor.mark_unreachable(&n2);

        let history = DriftHistory::new();
        let plan = detect(&executor, &[n1, n2], &expected, &history, &HashSet::new()).await;

        assert_eq!(plan.drifted_node_count(), 1);
        assert_eq!(plan.drift_reports[0].blast_radius_pct, 50.0);
    }

    #[tokio::test]
    async fn production_node_escalates_to_critical_after_three_consecutive_drifts() {
        let executor = FakeRemoteExecutorPort::new();
        let n1 = Node::parse("root@n1").unwrap();
        let expected = Fingerprint::new("fp-AAA").unwrap();
        executor.seed(&n1, Fingerprint::new("fp-STALE").unwrap());

        let history = DriftHistory::new();
        let mut production = HashSet::new();
        production.insert(n1.clone());

        detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        let plan = detect(&executor, &[n1.clone()], &expected, &history, &production).await;

        assert_eq!(plan.drift_reports[0].severity, DriftSeverity::Critical);
        assert!(plan.requires_approval);
    }

    #[tokio::test]
    async fn recovery_resets_the_consecutive_drift_streak() {
        let executor = FakeRemoteExecutorPort::new();
        let n1 = Node::parse("root@n1").unwrap();
        let expected = Fingerprint::new("fp-AAA").unwrap();
        let stale = Fingerprint::new("fp-STALE").unwrap();

        executor.seed(&n1, stale.clone());
        let history = DriftHistory::new();
        let production = HashSet::new();

        detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        assert_eq!(history.consecutive_count(&n1), 2);

        executor.seed(&n1, expected.clone());
        let recovered = detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        assert_eq!(recovered.drifted_node_count(), 0);
        assert_eq!(history.consecutive_count(&n1), 0);

        executor.seed(&n1, stale);
        let plan = detect(&executor, &[n1.clone()], &expected, &history, &production).await;
        assert_eq!(plan.drift_reports[0].severity, DriftSeverity::Low);
    }

    #[tokio::test]
    async fn congruent_nodes_produce_no_drift_reports() {
        let executor = FakeRemoteExecutorPort::new();
        let n1 = Node::parse("root@n1").unwrap();
        let expected = Fingerprint::new("fp-AAA").unwrap();
        executor.seed(&n1, expected.clone());

        let history = DriftHistory::new();
        let plan = detect(&executor, &[n1], &expected, &history, &HashSet::new()).await;

        assert_eq!(plan.drifted_node_count(), 0);
        assert!(!plan.requires_approval);
    }
}
