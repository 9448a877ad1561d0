//! Rollback: fan out `RemoteExecutorPort.rollback` to every
//! target node independently; one node's failure never blocks another's.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::instrument;

use chimera_ports::{EventBusPort, RemoteExecutorPort};
use chimera_types::{DomainEvent, EventEnvelope, EventSource, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    Ok,
    Failed(String),
}

#[instrument(skip(executor, bus), fields(targets = targets.len()))]
pub async fn execute(
    executor: &dyn RemoteExecutorPort,
    bus: &dyn EventBusPort,
    targets: &[Node],
    generation: Option<u64>,
) -> BTreeMap<Node, RollbackOutcome> {
    let results: Vec<(Node, RollbackOutcome)> = join_all(targets.iter().map(|node| async move {
        let outcome = match executor
            .rollback(std::slice::from_ref(node), generation)
            .await
        {
            Ok(true) => RollbackOutcome::Ok,
            Ok(false) => RollbackOutcome::Failed("rollback reported failure".to_string()),
            Err(err) => RollbackOutcome::Failed(err.to_string()),
        };
        (node.clone(), outcome)
    }))
    .await;

    for (node, outcome) in &results {
        let event = match outcome {
            RollbackOutcome::Ok => DomainEvent::NodeRolledBack {
                node: node.clone(),
                generation,
            },
            RollbackOutcome::Failed(reason) => DomainEvent::NodeRollbackFailed {
                node: node.clone(),
                reason: reason.clone(),
            },
        };
        bus.publish(vec![EventEnvelope::new(event, EventSource::Deployment)])
            .await;
    }

    results.into_iter().collect()
}

/// Thin owned-handle facade, mirroring [`crate::deploy_fleet::DeployFleet`].
pub struct Rollback {
    executor: Arc<dyn RemoteExecutorPort>,
    bus: Arc<dyn EventBusPort>,
}

impl Rollback {
    pub fn new(executor: Arc<dyn RemoteExecutorPort>, bus: Arc<dyn EventBusPort>) -> Self {
        Self { executor, bus }
    }

    pub async fn execute(
        &self,
        targets: &[Node],
        generation: Option<u64>,
    ) -> BTreeMap<Node, RollbackOutcome> {
        execute(self.executor.as_ref(), self.bus.as_ref(), targets, generation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_eventbus::InProcessEventBus;
    use chimera_ports::fakes::FakeRemoteExecutorPort;
    use chimera_types::Fingerprint;

    fn node(n: &str) -> Node {
        Node::parse(n).unwrap()
    }

    #[tokio::test]
    async fn partial_failure_does_not_abort_other_nodes() {
        let executor = FakeRemoteExecutorPort::new();
        let bus = InProcessEventBus::new();

        let good = node("root@n1");
        let bad = node("root@n2");
        executor
            .sync_closure(&[good.clone()], &Fingerprint::new("fp-AAA").unwrap())
            .await
            .unwrap();
        executor
            .sync_closure(&[good.clone()], &Fingerprint::new("fp-BBB").unwrap())
            .await
            .unwrap();
        executor.mark_unreachable(&bad);

        let outcomes = execute(&executor, &bus, &[good.clone(), bad.clone()], None).await;
        assert_eq!(outcomes.get(&good), Some(&RollbackOutcome::Ok));
        assert_eq!(
            outcomes.get(&bad),
            Some(&RollbackOutcome::Failed(
                "rollback reported failure".to_string()
            ))
        );
    }
}
