//! Orchestrator RPC: reporting health/drift upward and fetching healing
//! commands down from a fleet-wide controller.

use crate::error::PortResult;
use async_trait::async_trait;
use chimera_types::{DriftReport, Node};
use serde::{Deserialize, Serialize};

/// A healing command handed down by the orchestrator for local execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingCommand {
    pub playbook_id: String,
    pub targets: Vec<Node>,
    pub reason: String,
}

#[async_trait]
pub trait OrchestratorPort: Send + Sync {
    async fn report_health(&self, node: &Node, healthy: bool) -> PortResult<()>;

    async fn report_drift(&self, report: &DriftReport) -> PortResult<()>;

    /// Poll for a pending healing command, if the orchestrator has one queued.
    async fn fetch_healing_command(&self) -> PortResult<Option<HealingCommand>>;

    async fn acknowledge_healing(&self, playbook_id: &str, succeeded: bool) -> PortResult<()>;
}
