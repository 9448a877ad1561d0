//! The remote-exec transport that copies closures to nodes and runs shell
//! commands on them.

use crate::error::PortResult;
use async_trait::async_trait;
use chimera_types::{Fingerprint, Node};

#[async_trait]
pub trait RemoteExecutorPort: Send + Sync {
    /// Copy the closure for `fingerprint` to every node in `nodes`.
    async fn sync_closure(&self, nodes: &[Node], fingerprint: &Fingerprint) -> PortResult<bool>;

    /// Run `cmd` on every node in `nodes`.
    async fn exec(&self, nodes: &[Node], cmd: &str) -> PortResult<bool>;

    /// Query a single node's currently active fingerprint. `None` means the
    /// node was unreachable, not that it has no fingerprint.
    async fn current_fingerprint(&self, node: &Node) -> PortResult<Option<Fingerprint>>;

    /// Roll a node back to `generation`, or the immediately prior generation
    /// if `None`.
    async fn rollback(&self, nodes: &[Node], generation: Option<u64>) -> PortResult<bool>;
}
