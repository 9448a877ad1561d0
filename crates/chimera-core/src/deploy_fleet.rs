//! Deploy Fleet: build once, sync to every target
//! concurrently, then run the deployment command on every node that synced,
//! tolerating partial per-node failure throughout.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::instrument;

use chimera_ports::{BuildPort, EventBusPort, RemoteExecutorPort, SessionPort};
use chimera_types::{ConfigPath, Deployment, EventEnvelope, EventSource, Node, SessionId};

use crate::error::CoreResult;

/// Per-node result of a Deploy Fleet run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Ok,
    SyncFailed,
    RunFailed,
}

pub struct DeployFleetResult {
    pub deployment: Deployment,
    pub outcomes: BTreeMap<Node, NodeOutcome>,
}

/// Drain `deployment`'s accumulated events and publish exactly those,
/// keeping the bus in lockstep with the aggregate's own authoritative log.
async fn drain_and_publish(bus: &dyn EventBusPort, deployment: Deployment) -> Deployment {
    let (deployment, events) = deployment.drain_events();
    if !events.is_empty() {
        bus.publish(
            events
                .into_iter()
                .map(|e| EventEnvelope::new(e, EventSource::Deployment))
                .collect(),
        )
        .await;
    }
    deployment
}

/// Run the Deploy Fleet use case against `targets`.
#[instrument(skip(build, session, executor, bus), fields(targets = targets.len()))]
pub async fn execute(
    build: &dyn BuildPort,
    session: &dyn SessionPort,
    executor: &dyn RemoteExecutorPort,
    bus: &dyn EventBusPort,
    config_path: ConfigPath,
    command: &str,
    session_name: SessionId,
    targets: &[Node],
) -> CoreResult<DeployFleetResult> {
    let deployment = Deployment::new(session_name.clone(), config_path.clone());
    let deployment = deployment.start_building()?;
    let deployment = drain_and_publish(bus, deployment).await;

    let fingerprint = match build.build(&config_path).await {
        Ok(fp) => fp,
        Err(err) => {
            let deployment = deployment.fail(err.to_string())?;
            let deployment = drain_and_publish(bus, deployment).await;
            return Ok(DeployFleetResult {
                deployment,
                outcomes: BTreeMap::new(),
            });
        }
    };

    let deployment = deployment.complete_build(fingerprint.clone())?;
    let deployment = drain_and_publish(bus, deployment).await;
    let deployment = deployment.start_deploying()?;

    let sync_results: Vec<(Node, bool)> = join_all(targets.iter().map(|node| {
        let fingerprint = fingerprint.clone();
        async move {
            let ok = executor
                .sync_closure(std::slice::from_ref(node), &fingerprint)
                .await
                .unwrap_or(false);
            (node.clone(), ok)
        }
    }))
    .await;

    let surviving: Vec<Node> = sync_results
        .iter()
        .filter(|(_, ok)| *ok)
        .map(|(node, _)| node.clone())
        .collect();

    if surviving.is_empty() && !targets.is_empty() {
        let deployment = deployment.fail("all targets failed to sync")?;
        let deployment = drain_and_publish(bus, deployment).await;
        let outcomes = sync_results
            .into_iter()
            .map(|(node, _)| (node, NodeOutcome::SyncFailed))
            .collect();
        return Ok(DeployFleetResult {
            deployment,
            outcomes,
        });
    }

    let _ = session.create(&session_name).await;

    let run_results: Vec<(Node, bool)> = join_all(surviving.iter().map(|node| async move {
        let ok = executor
            .exec(std::slice::from_ref(node), command)
            .await
            .unwrap_or(false);
        (node.clone(), ok)
    }))
    .await;

    let mut outcomes: BTreeMap<Node, NodeOutcome> = sync_results
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(node, _)| (node, NodeOutcome::SyncFailed))
        .collect();

    let any_run_succeeded = run_results.iter().any(|(_, ok)| *ok);
    for (node, ok) in run_results {
        outcomes.insert(node, if ok { NodeOutcome::Ok } else { NodeOutcome::RunFailed });
    }

    let deployment = if any_run_succeeded || targets.is_empty() {
        deployment.complete()?
    } else {
        deployment.fail("no node completed the run step")?
    };
    let deployment = drain_and_publish(bus, deployment).await;

    Ok(DeployFleetResult {
        deployment,
        outcomes,
    })
}

/// Thin facade bundling the ports Deploy Fleet needs, for callers that want
/// an owned, cloneable handle instead of passing four references around.
pub struct DeployFleet {
    build: Arc<dyn BuildPort>,
    session: Arc<dyn SessionPort>,
    executor: Arc<dyn RemoteExecutorPort>,
    bus: Arc<dyn EventBusPort>,
}

impl DeployFleet {
    pub fn new(
        build: Arc<dyn BuildPort>,
        session: Arc<dyn SessionPort>,
        executor: Arc<dyn RemoteExecutorPort>,
        bus: Arc<dyn EventBusPort>,
    ) -> Self {
        Self {
            build,
            session,
            executor,
            bus,
        }
    }

    pub async fn execute(
        &self,
        config_path: ConfigPath,
        command: &str,
        session_name: SessionId,
        targets: &[Node],
    ) -> CoreResult<DeployFleetResult> {
        execute(
            self.build.as_ref(),
            self.session.as_ref(),
            self.executor.as_ref(),
            self.bus.as_ref(),
            config_path,
            command,
            session_name,
            targets,
        )
        .await
    }
}
