//! Alert-sink notification port.

use crate::error::PortResult;
use crate::itsm::IncidentSeverity;
use async_trait::async_trait;

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_alert(
        &self,
        title: &str,
        message: &str,
        severity: IncidentSeverity,
        node_id: Option<&str>,
    ) -> PortResult<()>;

    async fn send_resolution(&self, title: &str, message: &str, node_id: Option<&str>) -> PortResult<()>;
}
