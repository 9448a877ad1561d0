//! CLI error type and its mapping onto the exit codes of the CLI surface:
//! 0 success, 1 partial failure, 2 invalid arguments, 3 authorization denied.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("one or more targets failed")]
    PartialFailure,

    #[error(transparent)]
    Core(#[from] chimera_core::CoreError),

    #[error(transparent)]
    Port(#[from] chimera_ports::PortFailure),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::AuthorizationDenied(_) => 3,
            CliError::PartialFailure => 1,
            CliError::Core(chimera_core::CoreError::PolicyDenied { .. }) => 3,
            CliError::Core(_) => 1,
            CliError::Port(_) => 1,
            CliError::Config(_) => 2,
            CliError::Other(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
