//! Deployment aggregate root and its state machine.
//!
//! A `Deployment` is immutable: every legal transition returns a new
//! instance with the transition's event appended to the event log.

use crate::events::DomainEvent;
use crate::ids::{ConfigPath, Fingerprint, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deployment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Pending,
    Building,
    Built,
    Deploying,
    Completed,
    Failed,
    RolledBack,
}

impl DeploymentStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeploymentStatus::Completed | DeploymentStatus::Failed | DeploymentStatus::RolledBack
        )
    }
}

/// Raised when an illegal status transition is attempted.
///
/// This indicates a caller bug: it is surfaced, never
/// swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid deployment state transition: {from:?} -> {to:?}")]
pub struct InvalidStateTransition {
    pub from: DeploymentStatus,
    pub to: DeploymentStatus,
}

/// A deployment manages the lifecycle of a single `chimera-core` fan-out
/// operation against a declarative configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub session_id: SessionId,
    pub config_path: ConfigPath,
    pub status: DeploymentStatus,
    pub fingerprint: Option<Fingerprint>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub events: Vec<DomainEvent>,
}

impl Deployment {
    pub fn new(session_id: SessionId, config_path: ConfigPath) -> Self {
        Self {
            session_id,
            config_path,
            status: DeploymentStatus::Pending,
            fingerprint: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            events: Vec::new(),
        }
    }

    fn transition(
        &self,
        to: DeploymentStatus,
        append: Option<DomainEvent>,
    ) -> Result<Self, InvalidStateTransition> {
        if self.status.is_terminal() {
            return Err(InvalidStateTransition {
                from: self.status,
                to,
            });
        }
        let legal = matches!(
            (self.status, to),
            (DeploymentStatus::Pending, DeploymentStatus::Building)
                | (DeploymentStatus::Building, DeploymentStatus::Built)
                | (DeploymentStatus::Building, DeploymentStatus::Failed)
                | (DeploymentStatus::Built, DeploymentStatus::Deploying)
                | (DeploymentStatus::Built, DeploymentStatus::Failed)
                | (DeploymentStatus::Deploying, DeploymentStatus::Completed)
                | (DeploymentStatus::Deploying, DeploymentStatus::Failed)
                | (DeploymentStatus::Failed, DeploymentStatus::RolledBack)
        );
        if !legal {
            return Err(InvalidStateTransition {
                from: self.status,
                to,
            });
        }

        let mut next = self.clone();
        next.status = to;
        if let Some(event) = append {
            next.events.push(event);
        }
        Ok(next)
    }

    pub fn start_building(&self) -> Result<Self, InvalidStateTransition> {
        self.transition(
            DeploymentStatus::Building,
            Some(DomainEvent::DeploymentStarted {
                session_id: self.session_id.clone(),
            }),
        )
    }

    pub fn complete_build(&self, fingerprint: Fingerprint) -> Result<Self, InvalidStateTransition> {
        let mut next = self.transition(
            DeploymentStatus::Built,
            Some(DomainEvent::BuildCompleted {
                session_id: self.session_id.clone(),
                fingerprint: fingerprint.clone(),
            }),
        )?;
        next.fingerprint = Some(fingerprint);
        Ok(next)
    }

    /// Built -> Deploying carries no event of its own; the fan-out use case
    /// publishes per-node progress separately if it chooses to.
    pub fn start_deploying(&self) -> Result<Self, InvalidStateTransition> {
        self.transition(DeploymentStatus::Deploying, None)
    }

    pub fn complete(&self) -> Result<Self, InvalidStateTransition> {
        self.transition(
            DeploymentStatus::Completed,
            Some(DomainEvent::DeploymentCompleted {
                session_id: self.session_id.clone(),
            }),
        )
    }

    pub fn fail(&self, reason: impl Into<String>) -> Result<Self, InvalidStateTransition> {
        let reason = reason.into();
        let mut next = self.transition(
            DeploymentStatus::Failed,
            Some(DomainEvent::DeploymentFailed {
                session_id: self.session_id.clone(),
                reason: reason.clone(),
            }),
        )?;
        next.error_message = Some(reason);
        Ok(next)
    }

    pub fn roll_back(&self) -> Result<Self, InvalidStateTransition> {
        self.transition(
            DeploymentStatus::RolledBack,
            Some(DomainEvent::DeploymentRolledBack {
                session_id: self.session_id.clone(),
            }),
        )
    }

    /// Drain the accumulated events, returning them along with a copy of
    /// `self` with an empty event log. Used by the invoking use case to
    /// publish events exactly once.
    pub fn drain_events(&self) -> (Self, Vec<DomainEvent>) {
        let mut next = self.clone();
        let events = std::mem::take(&mut next.events);
        (next, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_deployment() -> Deployment {
        Deployment::new(
            SessionId::new("sess-1").unwrap(),
            ConfigPath::new("./config.nix").unwrap(),
        )
    }

    #[test]
    fn happy_path_transitions_append_events_in_order() {
        let d0 = new_deployment();
        let d1 = d0.start_building().unwrap();
        let d2 = d1
            .complete_build(Fingerprint::new("fp-AAA").unwrap())
            .unwrap();
        let d3 = d2.start_deploying().unwrap();
        let d4 = d3.complete().unwrap();

        assert_eq!(d4.status, DeploymentStatus::Completed);
        assert_eq!(d4.events.len(), 3);
        assert!(matches!(d4.events[0], DomainEvent::DeploymentStarted { .. }));
        assert!(matches!(d4.events[1], DomainEvent::BuildCompleted { .. }));
        assert!(matches!(d4.events[2], DomainEvent::DeploymentCompleted { .. }));
    }

    #[test]
    fn terminal_status_rejects_further_transitions() {
        let d = new_deployment().start_building().unwrap();
        let d = d.fail("boom").unwrap();
        assert_eq!(d.status, DeploymentStatus::Failed);

        let err = d.start_building().unwrap_err();
        assert_eq!(err.from, DeploymentStatus::Failed);

        // rollback from Failed is legal, but Completed/RolledBack are terminal too
        let rolled = d.roll_back().unwrap();
        assert!(rolled.roll_back().is_err());
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let d = new_deployment();
        // Pending -> Deploying skips Building/Built
        let err = d
            .transition(
                DeploymentStatus::Deploying,
                Some(DomainEvent::DeploymentStarted {
                    session_id: d.session_id.clone(),
                }),
            )
            .unwrap_err();
        assert_eq!(err.from, DeploymentStatus::Pending);
        assert_eq!(err.to, DeploymentStatus::Deploying);
    }
}
