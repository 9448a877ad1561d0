//! `deploy` command: build, sync, and run a command across a fleet.

use chimera_core::{ChimeraCore, NodeOutcome};
use chimera_types::{ConfigPath, Node, SessionId};

use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_success};

pub async fn execute(
    core: &ChimeraCore,
    subject_id: &str,
    config_path: &str,
    session_name: &str,
    targets: &str,
    command: &str,
) -> CliResult<()> {
    let config_path = ConfigPath::new(config_path)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let session_name = SessionId::new(session_name)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let targets: Vec<Node> =
        Node::parse_targets(targets).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    if targets.is_empty() {
        return Err(CliError::InvalidArgument("at least one target is required".to_string()));
    }

    let result = core
        .deploy_fleet(subject_id, config_path, command, session_name, &targets)
        .await?;

    let mut any_failed = false;
    for (node, outcome) in &result.outcomes {
        match outcome {
            NodeOutcome::Ok => print_success(&format!("{node}: ok")),
            NodeOutcome::SyncFailed => {
                any_failed = true;
                print_error(&format!("{node}: sync failed"));
            }
            NodeOutcome::RunFailed => {
                any_failed = true;
                print_error(&format!("{node}: run failed"));
            }
        }
    }

    if result.deployment.status == chimera_types::DeploymentStatus::Failed {
        return Err(CliError::PartialFailure);
    }
    if any_failed {
        return Err(CliError::PartialFailure);
    }
    Ok(())
}
