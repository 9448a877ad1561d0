//! `watch` command: run the autonomous healing loop against a fleet, either
//! once or until interrupted.

use std::sync::Arc;

use chimera_core::{AutonomousLoopConfig, ChimeraCore};
use chimera_types::{ConfigPath, Node, SessionId};

use crate::error::{CliError, CliResult};
use crate::output::print_success;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    core: Arc<ChimeraCore>,
    subject_id: &str,
    config_path: &str,
    session_name: &str,
    targets: &str,
    interval_seconds: u64,
    once: bool,
) -> CliResult<()> {
    let config_path = ConfigPath::new(config_path)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let session_name = SessionId::new(session_name)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let targets: Vec<Node> =
        Node::parse_targets(targets).map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);

    let config = AutonomousLoopConfig {
        config_path,
        targets,
        interval_seconds,
        session_name,
        once,
        subject_id: subject_id.to_string(),
    };

    if once {
        core.run_autonomous_loop(config, cancel_rx).await?;
        print_success("watch cycle complete");
        return Ok(());
    }

    let loop_core = core.clone();
    let handle = tokio::spawn(async move { loop_core.run_autonomous_loop(config, cancel_rx).await });

    tokio::select! {
        result = handle => {
            result.map_err(|e| CliError::Other(anyhow::anyhow!(e)))??;
        }
        _ = tokio::signal::ctrl_c() => {
            let _ = cancel_tx.send(true);
        }
    }
    print_success("watch stopped");
    Ok(())
}
