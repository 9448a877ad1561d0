//! Congruence and drift report value types.

use crate::ids::{Fingerprint, Node};
use serde::{Deserialize, Serialize};

/// Result of comparing a node's actual fingerprint to the expected one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CongruenceReport {
    pub node: Node,
    pub expected: Fingerprint,
    pub actual: Option<Fingerprint>,
    pub is_congruent: bool,
    pub details: String,
}

impl CongruenceReport {
    /// Build a report from an observed (possibly absent) actual fingerprint.
    ///
    /// A missing `actual` means the node was unreachable; such a report is
    /// always non-congruent with `details = "unreachable"`.
    pub fn observe(node: Node, expected: Fingerprint, actual: Option<Fingerprint>) -> Self {
        match actual {
            None => Self {
                node,
                expected,
                actual: None,
                is_congruent: false,
                details: "unreachable".to_string(),
            },
            Some(actual) => {
                let is_congruent = actual == expected;
                let details = if is_congruent {
                    "congruent".to_string()
                } else {
                    format!("drift: expected {} got {}", expected, actual)
                };
                Self {
                    node,
                    expected,
                    actual: Some(actual),
                    is_congruent,
                    details,
                }
            }
        }
    }
}

/// Drift severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DriftSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Remediation suggested for a drift report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestedAction {
    RestartService,
    RebuildConfig,
    RollbackGeneration,
    ManualIntervention,
}

impl DriftSeverity {
    /// Map severity to the suggested remediation.
    pub fn suggested_action(self) -> SuggestedAction {
        match self {
            DriftSeverity::Low => SuggestedAction::RestartService,
            DriftSeverity::Medium | DriftSeverity::High => SuggestedAction::RebuildConfig,
            DriftSeverity::Critical => SuggestedAction::RollbackGeneration,
        }
    }
}

/// A single node's drift, with severity and the recommended remediation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub node: Node,
    pub expected: Fingerprint,
    pub actual: Option<Fingerprint>,
    pub severity: DriftSeverity,
    pub blast_radius_pct: f64,
    pub suggested_action: SuggestedAction,
    pub detected_at: chrono::DateTime<chrono::Utc>,
}
