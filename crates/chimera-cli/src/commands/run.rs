//! `run` command: build the local config, ensure a session exists, and run
//! a command inside it. A single-node convenience wrapper around the build
//! and session ports; it does not touch the fleet.

use chimera_ports::{BuildPort, SessionPort};
use chimera_types::{ConfigPath, SessionId};

use crate::error::{CliError, CliResult};
use crate::output::print_success;

pub async fn execute(
    build: &dyn BuildPort,
    session: &dyn SessionPort,
    config_path: &str,
    session_name: &str,
    command: &str,
) -> CliResult<()> {
    let config_path = ConfigPath::new(config_path)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let session_name = SessionId::new(session_name)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let fingerprint = build.build(&config_path).await?;
    print_success(&format!("built {fingerprint}"));

    session.create(&session_name).await?;
    let ok = session.run(&session_name, command).await?;
    if !ok {
        return Err(CliError::PartialFailure);
    }

    print_success(&format!("ran `{command}` in session {session_name}"));
    Ok(())
}
