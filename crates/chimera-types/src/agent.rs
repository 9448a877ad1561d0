//! Agent Registry value types.

use serde::{Deserialize, Serialize};

use crate::congruence::DriftReport;
use crate::ids::Node;

/// Health of a registered fleet node, inferred from heartbeat recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentHealth {
    Healthy,
    Degraded,
    Unreachable,
}

/// One node's registry entry: last contact, last known drift, current health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub node: Node,
    pub last_heartbeat: chrono::DateTime<chrono::Utc>,
    pub last_drift_report: Option<DriftReport>,
    pub health: AgentHealth,
}

impl AgentRecord {
    pub fn new(node: Node, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            node,
            last_heartbeat: now,
            last_drift_report: None,
            health: AgentHealth::Healthy,
        }
    }
}
