//! Core value objects and entities shared by every Chimera crate.
//!
//! # Architectural Boundaries
//!
//! `chimera-types` has no dependency on any other `chimera-*` crate and no
//! knowledge of I/O, transport, or persistence. It defines the data the rest
//! of the system passes around: identifiers (`ids`), the deployment
//! aggregate and its state machine (`deployment`), the closed event set
//! (`events`), congruence/drift reports (`congruence`), playbooks
//! (`playbook`), SLOs (`slo`), and the policy data shape (`policy`).
//!
//! # Key Concepts
//!
//! - **Value objects are immutable.** Transition methods return a new
//!   instance rather than mutating `self`, so a caller can never observe a
//!   half-applied state change.
//! - **Validation happens at construction.** `Fingerprint::new`,
//!   `Node::parse`, `Playbook::validate` and friends reject malformed input
//!   at the boundary; once constructed, a value is trusted everywhere else.
#![cfg_attr(feature = "strict-docs", deny(missing_docs))]
#![deny(unsafe_code)]

pub mod agent;
pub mod congruence;
pub mod deployment;
pub mod events;
pub mod ids;
pub mod playbook;
pub mod policy;
pub mod slo;

pub use agent::{AgentHealth, AgentRecord};
pub use congruence::{CongruenceReport, DriftReport, DriftSeverity, SuggestedAction};
pub use deployment::{Deployment, DeploymentStatus, InvalidStateTransition};
pub use events::{DomainEvent, EventEnvelope, EventSeverity, EventSource};
pub use ids::{ConfigPath, Fingerprint, Node, SessionId, ValidationError};
pub use playbook::{
    Action, Playbook, PlaybookStep, PlaybookValidationError, StepOutcome, StepResult,
};
pub use policy::{Permission, Policy, RoleName, SubjectId};
pub use slo::Slo;
