//! Port failure types.
//!
//! A `PortFailure` is always attributable to a single adapter call; callers
//! that fan out across nodes capture it per-node rather than letting one
//! failing port call abort the whole fan-out.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortFailure {
    #[error("{port} timed out after {elapsed_ms}ms")]
    Timeout { port: &'static str, elapsed_ms: u64 },

    #[error("{port} adapter failed: {cause}")]
    AdapterFailed { port: &'static str, cause: String },

    #[error("{port} has no adapter configured")]
    Unconfigured { port: &'static str },
}

pub type PortResult<T> = Result<T, PortFailure>;
