//! Domain events published by the core use cases onto the event bus.

use crate::ids::{ConfigPath, Fingerprint, Node, SessionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an event originated, for filtering and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    Deployment,
    Drift,
    Playbook,
    Policy,
    Slo,
    Analytics,
    Rca,
    Registry,
    Loop,
}

/// Severity used for alert routing and audit log coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// The closed set of events the core can emit.
///
/// Every variant carries enough identifying data to be correlated and
/// audited without a back-reference into the originating use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    // Deployment lifecycle
    DeploymentStarted {
        session_id: SessionId,
    },
    BuildCompleted {
        session_id: SessionId,
        fingerprint: Fingerprint,
    },
    DeploymentCompleted {
        session_id: SessionId,
    },
    DeploymentFailed {
        session_id: SessionId,
        reason: String,
    },
    DeploymentRolledBack {
        session_id: SessionId,
    },

    // Rollback
    NodeRolledBack {
        node: Node,
        generation: Option<u64>,
    },
    NodeRollbackFailed {
        node: Node,
        reason: String,
    },

    // Drift detection
    DriftDetected {
        node: Node,
        severity: String,
    },
    HealingPlanReady {
        drifted_node_count: usize,
        requires_approval: bool,
    },

    // Playbook engine
    PlaybookSkipped {
        playbook_id: String,
        reason: String,
    },
    PlaybookCompleted {
        playbook_id: String,
    },
    PlaybookFailed {
        playbook_id: String,
        failed_step: String,
    },
    PlaybookRolledBack {
        playbook_id: String,
    },

    // Policy / autonomous loop
    HealingSkipped {
        reason: String,
    },
    PolicyDenied {
        subject_id: String,
        permission: String,
    },

    // Config path reference for traceability
    ConfigBuilt {
        config_path: ConfigPath,
        fingerprint: Fingerprint,
    },
}

impl DomainEvent {
    fn default_severity(&self) -> EventSeverity {
        match self {
            DomainEvent::DeploymentFailed { .. }
            | DomainEvent::NodeRollbackFailed { .. }
            | DomainEvent::PlaybookFailed { .. }
            | DomainEvent::PolicyDenied { .. } => EventSeverity::Error,

            DomainEvent::HealingSkipped { .. }
            | DomainEvent::PlaybookSkipped { .. }
            | DomainEvent::PlaybookRolledBack { .. } => EventSeverity::Warning,

            DomainEvent::DriftDetected { severity, .. } if severity == "CRITICAL" => {
                EventSeverity::Critical
            }
            DomainEvent::DriftDetected { .. } | DomainEvent::HealingPlanReady { .. } => {
                EventSeverity::Warning
            }

            _ => EventSeverity::Info,
        }
    }
}

/// Envelope wrapping every event published onto the bus, giving it an
/// identity, a timestamp, and routing metadata independent of payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub source: EventSource,
    pub severity: EventSeverity,
    pub correlation_id: Option<String>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent, source: EventSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: chrono::Utc::now(),
            source,
            severity: event.default_severity(),
            correlation_id: None,
            event,
        }
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_inferred_from_variant() {
        let e = EventEnvelope::new(
            DomainEvent::DeploymentFailed {
                session_id: SessionId::new("s").unwrap(),
                reason: "boom".into(),
            },
            EventSource::Deployment,
        );
        assert_eq!(e.severity, EventSeverity::Error);
    }

    #[test]
    fn critical_drift_severity() {
        let e = EventEnvelope::new(
            DomainEvent::DriftDetected {
                node: Node::parse("root@n1").unwrap(),
                severity: "CRITICAL".into(),
            },
            EventSource::Drift,
        );
        assert_eq!(e.severity, EventSeverity::Critical);
    }
}
