use thiserror::Error;

use chimera_ports::PortFailure;
use chimera_types::InvalidStateTransition;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("policy denied: {subject_id} lacks permission for {operation}")]
    PolicyDenied {
        subject_id: String,
        operation: String,
    },

    #[error("build failed: {0}")]
    BuildFailed(#[source] PortFailure),

    #[error("all targets failed to sync")]
    AllTargetsFailed,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidStateTransition),

    #[error(transparent)]
    Port(#[from] PortFailure),
}

pub type CoreResult<T> = Result<T, CoreError>;
