//! The build tool that turns a declarative config path into a fingerprint
//! and materializes a closure on disk.

use crate::error::PortResult;
use async_trait::async_trait;
use chimera_types::{ConfigPath, Fingerprint};

#[async_trait]
pub trait BuildPort: Send + Sync {
    /// Evaluate and build `path`, returning its content-addressed fingerprint.
    async fn build(&self, path: &ConfigPath) -> PortResult<Fingerprint>;

    /// Materialize `path` on disk without building a running system,
    /// returning the derivation path.
    async fn instantiate(&self, path: &ConfigPath) -> PortResult<String>;

    /// Resolve the effective shell command a fingerprint-local shell would
    /// run for `cmd`, without executing it.
    async fn shell(&self, path: &ConfigPath, cmd: &str) -> PortResult<String>;
}
