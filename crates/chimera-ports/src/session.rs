//! The persistent-session host that runs long-lived commands on a node.

use crate::error::PortResult;
use async_trait::async_trait;
use chimera_types::SessionId;

#[async_trait]
pub trait SessionPort: Send + Sync {
    /// Create a new persistent session, returning whether it was created
    /// (`false` if a session with this id already exists).
    async fn create(&self, id: &SessionId) -> PortResult<bool>;

    /// List the ids of all live sessions.
    async fn list(&self) -> PortResult<Vec<SessionId>>;

    /// Terminate a session, returning whether it existed.
    async fn kill(&self, id: &SessionId) -> PortResult<bool>;

    /// Run `cmd` inside the session, returning whether it succeeded.
    async fn run(&self, id: &SessionId, cmd: &str) -> PortResult<bool>;

    /// Resolve the command a caller should run locally to attach to the
    /// session's terminal (e.g. a `tmux attach` invocation).
    async fn attach(&self, id: &SessionId) -> PortResult<String>;
}
