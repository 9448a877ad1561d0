//! Core use cases orchestrating ports, policy, and drift detection:
//! Deploy Fleet, Rollback, the Autonomous Loop, and the Agent Registry.

pub mod agent_registry;
pub mod autonomous_loop;
pub mod deploy_fleet;
pub mod error;
pub mod facade;
pub mod rollback;

pub use agent_registry::AgentRegistry;
pub use autonomous_loop::{run as run_autonomous_loop, AutonomousLoopConfig};
pub use deploy_fleet::{DeployFleet, DeployFleetResult, NodeOutcome};
pub use error::{CoreError, CoreResult};
pub use facade::ChimeraCore;
pub use rollback::{Rollback, RollbackOutcome};
