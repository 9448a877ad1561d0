//! Playbook engine: validates preconditions, runs each step through an
//! authorize/execute/timeout state machine, and rolls back completed steps
//! on failure.

pub mod context;
pub mod engine;
pub mod executor;

pub use context::{PlaybookContext, Precondition, PreconditionRegistry};
pub use engine::{run_playbook, PlaybookEngine, PlaybookRunOutcome};
pub use executor::{required_permission, ActionExecutor};
