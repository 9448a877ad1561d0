use chrono::{DateTime, Utc};

use chimera_types::{DriftReport, Fingerprint, Node};

use crate::candidate::{CandidateCause, CauseKind};

/// Tunable windows and scaling constants for root-cause correlation. The
/// numerical scales beyond ordering are a defensible reconstruction, not a
/// pinned-down formula.
#[derive(Debug, Clone, Copy)]
pub struct RcaConfig {
    pub deployment_window_seconds: i64,
    pub spatial_window_seconds: i64,
    pub fleet_wide_scale: f64,
    pub repeated_drift_scale: f64,
    pub unknown_floor: f64,
}

impl Default for RcaConfig {
    fn default() -> Self {
        Self {
            deployment_window_seconds: 3600,
            spatial_window_seconds: 600,
            fleet_wide_scale: 5.0,
            repeated_drift_scale: 10.0,
            unknown_floor: 0.05,
        }
    }
}

/// A deployment completion on the focal node, already correlated by the
/// caller from `DeploymentCompleted` events to their originating node.
#[derive(Debug, Clone)]
pub struct RecentDeployment {
    pub node: Node,
    pub completed_at: DateTime<Utc>,
}

/// A drift observation on some other node in the fleet.
#[derive(Debug, Clone)]
pub struct FleetDriftObservation {
    pub node: Node,
    pub fingerprint: Option<Fingerprint>,
    pub detected_at: DateTime<Utc>,
}

fn norm(value: f64, c: f64) -> f64 {
    (value / c).min(1.0)
}

fn recent_deployment_cause(
    focal: &DriftReport,
    deployments: &[RecentDeployment],
    now: DateTime<Utc>,
    config: &RcaConfig,
) -> Option<CandidateCause> {
    deployments
        .iter()
        .filter(|d| d.node == focal.node)
        .filter(|d| d.completed_at <= now)
        .max_by_key(|d| d.completed_at)
        .and_then(|latest| {
            let age_seconds = (now - latest.completed_at).num_seconds();
            if age_seconds > config.deployment_window_seconds {
                return None;
            }
            let confidence =
                (1.0 - age_seconds as f64 / config.deployment_window_seconds as f64).clamp(0.0, 1.0);
            Some(CandidateCause {
                kind: CauseKind::RecentDeployment,
                evidence: format!(
                    "deployment completed on {} {}s ago",
                    latest.node, age_seconds
                ),
                confidence,
            })
        })
}

fn fleet_wide_cause(
    focal: &DriftReport,
    observations: &[FleetDriftObservation],
    now: DateTime<Utc>,
    config: &RcaConfig,
) -> Option<CandidateCause> {
    let Some(focal_fingerprint) = focal.actual.as_ref() else {
        return None;
    };

    let matching = observations
        .iter()
        .filter(|o| o.node != focal.node)
        .filter(|o| o.fingerprint.as_ref() == Some(focal_fingerprint))
        .filter(|o| {
            let age_seconds = (now - o.detected_at).num_seconds();
            (0..=config.spatial_window_seconds).contains(&age_seconds)
        })
        .count();

    if matching == 0 {
        return None;
    }

    Some(CandidateCause {
        kind: CauseKind::FleetWide,
        evidence: format!(
            "{} other node(s) show the same fingerprint within {}s",
            matching, config.spatial_window_seconds
        ),
        confidence: norm(matching as f64, config.fleet_wide_scale),
    })
}

fn repeated_drift_cause(prior_drift_count_last_24h: usize, config: &RcaConfig) -> Option<CandidateCause> {
    if prior_drift_count_last_24h < 2 {
        return None;
    }
    Some(CandidateCause {
        kind: CauseKind::RepeatedDrift,
        evidence: format!(
            "{} prior drift report(s) on this node in the last 24h",
            prior_drift_count_last_24h
        ),
        confidence: norm(prior_drift_count_last_24h as f64, config.repeated_drift_scale),
    })
}

fn unknown_cause(config: &RcaConfig) -> CandidateCause {
    CandidateCause {
        kind: CauseKind::Unknown,
        evidence: "no correlated cause found".to_string(),
        confidence: config.unknown_floor,
    }
}

/// Rank candidate causes for `focal`, descending by confidence with ties
/// broken by [`CauseKind`] declaration order.
///
/// `recent_deployments` and `fleet_observations` may span any history; this
/// function applies the window filters itself. `prior_drift_count_last_24h`
/// must already be scoped by the caller to the focal node's last 24h.
pub fn correlate(
    focal: &DriftReport,
    recent_deployments: &[RecentDeployment],
    fleet_observations: &[FleetDriftObservation],
    prior_drift_count_last_24h: usize,
    now: DateTime<Utc>,
    config: &RcaConfig,
) -> Vec<CandidateCause> {
    let mut causes: Vec<CandidateCause> = vec![
        recent_deployment_cause(focal, recent_deployments, now, config),
        fleet_wide_cause(focal, fleet_observations, now, config),
        repeated_drift_cause(prior_drift_count_last_24h, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    causes.push(unknown_cause(config));

    causes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap()
            .then_with(|| a.kind.cmp(&b.kind))
    });

    causes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_types::{DriftSeverity, SuggestedAction};

    fn focal(node: Node, actual: Option<Fingerprint>) -> DriftReport {
        DriftReport {
            node,
            expected: Fingerprint::new("fp-expected").unwrap(),
            actual,
            severity: DriftSeverity::Medium,
            blast_radius_pct: 10.0,
            suggested_action: SuggestedAction::RebuildConfig,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_is_always_present_and_floored() {
        let report = focal(Node::parse("root@n1").unwrap(), None);
        let causes = correlate(&report, &[], &[], 0, Utc::now(), &RcaConfig::default());
        assert!(causes.iter().any(|c| c.kind == CauseKind::Unknown));
        assert_eq!(causes.last().unwrap().kind, CauseKind::Unknown);
    }

    #[test]
    fn recent_deployment_within_window_scales_with_age() {
        let node = Node::parse("root@n1").unwrap();
        let report = focal(node.clone(), None);
        let now = Utc::now();
        let deployments = vec![RecentDeployment {
            node,
            completed_at: now - chrono::Duration::seconds(60),
        }];
        let causes = correlate(&report, &deployments, &[], 0, now, &RcaConfig::default());
        let cause = causes
            .iter()
            .find(|c| c.kind == CauseKind::RecentDeployment)
            .expect("expected a recent deployment candidate");
        assert!(cause.confidence > 0.9);
    }

    #[test]
    fn deployment_outside_window_is_excluded() {
        let node = Node::parse("root@n1").unwrap();
        let report = focal(node.clone(), None);
        let now = Utc::now();
        let deployments = vec![RecentDeployment {
            node,
            completed_at: now - chrono::Duration::seconds(7200),
        }];
        let causes = correlate(&report, &deployments, &[], 0, now, &RcaConfig::default());
        assert!(!causes.iter().any(|c| c.kind == CauseKind::RecentDeployment));
    }

    #[test]
    fn fleet_wide_requires_matching_fingerprint_on_other_nodes() {
        let node = Node::parse("root@n1").unwrap();
        let other = Node::parse("root@n2").unwrap();
        let fp = Fingerprint::new("fp-drifted").unwrap();
        let report = focal(node, Some(fp.clone()));
        let now = Utc::now();
        let observations = vec![FleetDriftObservation {
            node: other,
            fingerprint: Some(fp),
            detected_at: now - chrono::Duration::seconds(30),
        }];
        let causes = correlate(&report, &[], &observations, 0, now, &RcaConfig::default());
        let cause = causes
            .iter()
            .find(|c| c.kind == CauseKind::FleetWide)
            .expect("expected a fleet-wide candidate");
        assert!(cause.confidence > 0.0);
    }

    #[test]
    fn repeated_drift_requires_at_least_two_prior_reports() {
        let report = focal(Node::parse("root@n1").unwrap(), None);
        let causes = correlate(&report, &[], &[], 1, Utc::now(), &RcaConfig::default());
        assert!(!causes.iter().any(|c| c.kind == CauseKind::RepeatedDrift));

        let causes = correlate(&report, &[], &[], 3, Utc::now(), &RcaConfig::default());
        assert!(causes.iter().any(|c| c.kind == CauseKind::RepeatedDrift));
    }

    #[test]
    fn ranking_is_descending_confidence_with_kind_tiebreak() {
        let node = Node::parse("root@n1").unwrap();
        let report = focal(node.clone(), None);
        let now = Utc::now();
        let deployments = vec![RecentDeployment {
            node,
            completed_at: now - chrono::Duration::seconds(60),
        }];
        let causes = correlate(&report, &deployments, &[], 5, now, &RcaConfig::default());
        for pair in causes.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
}
