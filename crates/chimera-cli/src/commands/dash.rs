//! `dash` command: read-only snapshot of each target's current fingerprint.

use chimera_ports::RemoteExecutorPort;
use chimera_types::Node;
use serde::Serialize;
use tabled::Tabled;

use crate::error::{CliError, CliResult};
use crate::output::{print_rows, OutputFormat};

#[derive(Serialize, Tabled)]
struct NodeStatusRow {
    node: String,
    fingerprint: String,
}

pub async fn execute(executor: &dyn RemoteExecutorPort, targets: &str, format: OutputFormat) -> CliResult<()> {
    let targets: Vec<Node> =
        Node::parse_targets(targets).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    if targets.is_empty() {
        return Err(CliError::InvalidArgument("at least one target is required".to_string()));
    }

    let mut rows = Vec::with_capacity(targets.len());
    for node in &targets {
        let fingerprint = executor
            .current_fingerprint(node)
            .await?
            .map(|fp| fp.to_string())
            .unwrap_or_else(|| "unreachable".to_string());
        rows.push(NodeStatusRow {
            node: node.to_string(),
            fingerprint,
        });
    }

    print_rows(rows, format);
    Ok(())
}
