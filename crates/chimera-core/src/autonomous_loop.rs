//! Autonomous Loop: build once, then repeatedly detect
//! drift and remediate, gated by policy, until cancelled or `once` is set.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use chimera_drift::{detect, DriftHistory, HealingPlan};
use chimera_policy::PolicyGate;
use chimera_ports::{BuildPort, EventBusPort, RemoteExecutorPort, SessionPort};
use chimera_types::{
    ConfigPath, DomainEvent, EventEnvelope, EventSource, Fingerprint, Node, Permission, SessionId,
    SuggestedAction,
};

use crate::deploy_fleet;
use crate::error::CoreResult;
use crate::rollback;

pub struct AutonomousLoopConfig {
    pub config_path: ConfigPath,
    pub targets: Vec<Node>,
    pub interval_seconds: u64,
    pub session_name: SessionId,
    pub once: bool,
    pub subject_id: String,
}

async fn remediate(
    build: &dyn BuildPort,
    session: &dyn SessionPort,
    executor: &dyn RemoteExecutorPort,
    bus: &dyn EventBusPort,
    config: &AutonomousLoopConfig,
    plan: &HealingPlan,
) {
    let Some(action) = plan.global_action else {
        return;
    };
    let drifted_targets: Vec<Node> = plan.drift_reports.iter().map(|r| r.node.clone()).collect();

    match action {
        SuggestedAction::RestartService => {
            let ok = executor.exec(&drifted_targets, "systemctl restart chimera-managed").await;
            if let Err(err) = ok {
                warn!(%err, "restart remediation failed");
            }
        }
        SuggestedAction::RebuildConfig => {
            if let Err(err) = deploy_fleet::execute(
                build,
                session,
                executor,
                bus,
                config.config_path.clone(),
                "chimera-reconcile",
                config.session_name.clone(),
                &drifted_targets,
            )
            .await
            {
                warn!(%err, "rebuild remediation failed");
            }
        }
        SuggestedAction::RollbackGeneration => {
            rollback::execute(executor, bus, &drifted_targets, None).await;
        }
        SuggestedAction::ManualIntervention => {
            bus.publish(vec![EventEnvelope::new(
                DomainEvent::HealingSkipped {
                    reason: "manual intervention required".to_string(),
                },
                EventSource::Loop,
            )])
            .await;
        }
    }
}

/// Run one cycle of the loop body: detect, decide, remediate. Returns the
/// plan that was evaluated so callers/tests can assert on it.
async fn tick(
    build: &dyn BuildPort,
    session: &dyn SessionPort,
    executor: &dyn RemoteExecutorPort,
    bus: &dyn EventBusPort,
    policy_gate: &dyn PolicyGate,
    history: &DriftHistory,
    production: &std::collections::HashSet<Node>,
    expected_fingerprint: &Fingerprint,
    config: &AutonomousLoopConfig,
) -> HealingPlan {
    let plan = detect(executor, &config.targets, expected_fingerprint, history, production).await;

    if plan.drifted_node_count() == 0 {
        return plan;
    }

    bus.publish(vec![EventEnvelope::new(
        DomainEvent::HealingPlanReady {
            drifted_node_count: plan.drifted_node_count(),
            requires_approval: plan.requires_approval,
        },
        EventSource::Loop,
    )])
    .await;

    if plan.requires_approval {
        let decision = policy_gate
            .evaluate(&config.subject_id, Permission::HealRebuild)
            .await;
        if decision.is_denied() {
            bus.publish(vec![EventEnvelope::new(
                DomainEvent::HealingSkipped {
                    reason: "healing requires approval and subject lacks HealRebuild".to_string(),
                },
                EventSource::Loop,
            )])
            .await;
            return plan;
        }
    }

    remediate(build, session, executor, bus, config, &plan).await;
    plan
}

/// Run the Autonomous Loop until `once` completes a single cycle or
/// `cancel` fires. `cancel` going to `true` is observed both at the sleep
/// and at the top of the next cycle.
#[instrument(skip_all, fields(targets = config.targets.len(), interval = config.interval_seconds))]
pub async fn run(
    build: Arc<dyn BuildPort>,
    session: Arc<dyn SessionPort>,
    executor: Arc<dyn RemoteExecutorPort>,
    bus: Arc<dyn EventBusPort>,
    policy_gate: Arc<dyn PolicyGate>,
    config: AutonomousLoopConfig,
    mut cancel: tokio::sync::watch::Receiver<bool>,
) -> CoreResult<Fingerprint> {
    let expected_fingerprint = build.build(&config.config_path).await?;
    let history = DriftHistory::default();
    let production: std::collections::HashSet<Node> = std::collections::HashSet::new();

    loop {
        if *cancel.borrow() {
            info!("autonomous loop cancelled before cycle start");
            break;
        }

        tick(
            build.as_ref(),
            session.as_ref(),
            executor.as_ref(),
            bus.as_ref(),
            policy_gate.as_ref(),
            &history,
            &production,
            &expected_fingerprint,
            &config,
        )
        .await;

        if config.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(config.interval_seconds)) => {}
            _ = cancel.changed() => {
                info!("autonomous loop cancelled during sleep");
                break;
            }
        }
    }

    Ok(expected_fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_eventbus::InProcessEventBus;
    use chimera_policy::PolicyEngineGate;
    use chimera_ports::fakes::{FakeBuildPort, FakeRemoteExecutorPort, FakeSessionPort};
    use chimera_types::Policy;

    fn node(n: &str) -> Node {
        Node::parse(n).unwrap()
    }

    #[tokio::test]
    async fn once_mode_runs_exactly_one_cycle() {
        let build = Arc::new(FakeBuildPort::new());
        let session = Arc::new(FakeSessionPort::new());
        let executor = Arc::new(FakeRemoteExecutorPort::new());
        let bus = Arc::new(InProcessEventBus::new());
        let policy_gate = Arc::new(PolicyEngineGate::new(Policy::with_builtin_roles()));

        let config = AutonomousLoopConfig {
            config_path: ConfigPath::new("./flake.nix").unwrap(),
            targets: vec![node("root@n1")],
            interval_seconds: 1,
            session_name: SessionId::new("loop-1").unwrap(),
            once: true,
            subject_id: "alice".to_string(),
        };
        let (_tx, rx) = tokio::sync::watch::channel(false);

        let fingerprint = run(build, session, executor, bus, policy_gate, config, rx)
            .await
            .unwrap();
        assert!(!fingerprint.as_str().is_empty());
    }

    #[tokio::test]
    async fn cancel_before_start_skips_every_cycle() {
        let build = Arc::new(FakeBuildPort::new());
        let session = Arc::new(FakeSessionPort::new());
        let executor = Arc::new(FakeRemoteExecutorPort::new());
        let bus = Arc::new(InProcessEventBus::new());
        let policy_gate = Arc::new(PolicyEngineGate::new(Policy::with_builtin_roles()));

        let config = AutonomousLoopConfig {
            config_path: ConfigPath::new("./flake.nix").unwrap(),
            targets: vec![node("root@n1")],
            interval_seconds: 1,
            session_name: SessionId::new("loop-2").unwrap(),
            once: false,
            subject_id: "alice".to_string(),
        };
        let (tx, rx) = tokio::sync::watch::channel(false);
        tx.send(true).unwrap();

        run(build, session, executor, bus, policy_gate, config, rx)
            .await
            .unwrap();
    }
}
