//! Action execution, abstracted behind a trait so the engine never depends
//! directly on the build/session/remote-exec adapters.

use async_trait::async_trait;
use chimera_types::{Action, Node, Permission};

/// Maps an action to the permission required to perform it.
pub fn required_permission(action: &Action) -> Permission {
    match action {
        Action::ExecShell { .. } | Action::RestartService { .. } => Permission::HealRestart,
        Action::Redeploy { .. } => Permission::HealRebuild,
        Action::Rollback { .. } => Permission::Rollback,
        Action::WaitSeconds { .. } | Action::AssertFingerprint { .. } => Permission::View,
    }
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Execute `action` against `node`, returning `Err` with a human
    /// readable cause on failure. Cancellation (timeout) is handled by the
    /// caller wrapping this future, not by the executor itself.
    async fn execute(&self, node: &Node, action: &Action) -> Result<(), String>;
}
