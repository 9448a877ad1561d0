//! `HealingPlan`: the output of a drift detection run.

use chimera_types::{DriftReport, DriftSeverity, SuggestedAction};

#[derive(Debug, Clone)]
pub struct HealingPlan {
    pub drift_reports: Vec<DriftReport>,
    pub global_action: Option<SuggestedAction>,
    pub requires_approval: bool,
}

impl HealingPlan {
    pub fn from_reports(drift_reports: Vec<DriftReport>) -> Self {
        let requires_approval = drift_reports
            .iter()
            .any(|r| matches!(r.severity, DriftSeverity::High | DriftSeverity::Critical));

        let global_action = drift_reports
            .iter()
            .max_by_key(|r| r.severity)
            .map(|r| r.suggested_action);

        Self {
            drift_reports,
            global_action,
            requires_approval,
        }
    }

    pub fn drifted_node_count(&self) -> usize {
        self.drift_reports.len()
    }
}
