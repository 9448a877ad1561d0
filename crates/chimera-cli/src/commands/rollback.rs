//! `rollback` command: roll every target back independently to a prior
//! generation (or the most recent one if unspecified).

use chimera_core::{ChimeraCore, RollbackOutcome};
use chimera_types::Node;

use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_success};

pub async fn execute(
    core: &ChimeraCore,
    subject_id: &str,
    targets: &str,
    generation: Option<u64>,
) -> CliResult<()> {
    let targets: Vec<Node> =
        Node::parse_targets(targets).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    if targets.is_empty() {
        return Err(CliError::InvalidArgument("at least one target is required".to_string()));
    }

    let outcomes = core.rollback(subject_id, &targets, generation).await;

    let mut any_failed = false;
    for (node, outcome) in &outcomes {
        match outcome {
            RollbackOutcome::Ok => print_success(&format!("{node}: rolled back")),
            RollbackOutcome::Failed(reason) => {
                any_failed = true;
                print_error(&format!("{node}: {reason}"));
            }
        }
    }

    if any_failed {
        return Err(CliError::PartialFailure);
    }
    Ok(())
}
