//! Incident-tracker (ITSM) integration port.

use crate::error::PortResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub ticket_id: String,
    pub title: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub node_id: Option<String>,
    pub resolved: bool,
}

#[async_trait]
pub trait ItsmPort: Send + Sync {
    async fn create_incident(
        &self,
        title: &str,
        description: &str,
        severity: IncidentSeverity,
        node_id: Option<&str>,
    ) -> PortResult<String>;

    async fn update(&self, ticket_id: &str, description: &str) -> PortResult<()>;

    async fn resolve(&self, ticket_id: &str) -> PortResult<()>;

    async fn get(&self, ticket_id: &str) -> PortResult<Option<Incident>>;
}
