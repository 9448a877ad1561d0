//! `agent` command: run a single node's heartbeat/drift-report loop against
//! the in-process agent registry, restarting the managed service when drift
//! is observed and auto-heal is enabled.

use chimera_ports::{EventBusPort, RemoteExecutorPort};
use chimera_types::{DomainEvent, EventEnvelope, EventSource, Node};
use tracing::{info, warn};

use chimera_core::AgentRegistry;

use crate::error::{CliError, CliResult};

pub async fn execute(
    registry: &AgentRegistry,
    executor: &dyn RemoteExecutorPort,
    bus: &dyn EventBusPort,
    node_id: &str,
    heartbeat_seconds: u64,
    drift_interval_seconds: u64,
    auto_heal: bool,
) -> CliResult<()> {
    let node = Node::parse(node_id).map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let baseline = executor.current_fingerprint(&node).await?;
    registry.heartbeat(node.clone(), chrono::Utc::now());
    info!(%node, "agent started, baseline captured");

    let mut elapsed_since_drift_check = 0u64;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(heartbeat_seconds)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!(%node, "agent stopping");
                return Ok(());
            }
        }

        registry.heartbeat(node.clone(), chrono::Utc::now());
        elapsed_since_drift_check += heartbeat_seconds;

        if elapsed_since_drift_check < drift_interval_seconds {
            continue;
        }
        elapsed_since_drift_check = 0;

        let actual = executor.current_fingerprint(&node).await?;
        if actual == baseline {
            continue;
        }

        warn!(%node, "drift detected against baseline");
        if auto_heal {
            let healed = executor.exec(std::slice::from_ref(&node), "systemctl restart chimera-managed").await?;
            if healed {
                info!(%node, "auto-heal restarted managed service");
            } else {
                warn!(%node, "auto-heal failed to restart managed service");
            }
        } else {
            bus.publish(vec![EventEnvelope::new(
                DomainEvent::HealingSkipped {
                    reason: format!("auto-heal disabled for {node}"),
                },
                EventSource::Registry,
            )])
            .await;
        }
    }
}
