//! `ChimeraCore`: the unified entry point composing every core use case
//! behind a single facade that records an audit trail alongside each
//! operation's outcome.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use chimera_observability::{AuditDecision, AuditEntry, AuditLog, MetricsRegistry};
use chimera_policy::PolicyGate;
use chimera_ports::{BuildPort, EventBusPort, RemoteExecutorPort, SessionPort};
use chimera_types::{ConfigPath, Node, SessionId};

use crate::agent_registry::AgentRegistry;
use crate::autonomous_loop::{self, AutonomousLoopConfig};
use crate::deploy_fleet::{self, DeployFleetResult};
use crate::error::CoreResult;
use crate::rollback::{self, RollbackOutcome};

pub struct ChimeraCore {
    build: Arc<dyn BuildPort>,
    session: Arc<dyn SessionPort>,
    executor: Arc<dyn RemoteExecutorPort>,
    bus: Arc<dyn EventBusPort>,
    policy_gate: Arc<dyn PolicyGate>,
    pub audit: Arc<AuditLog>,
    pub metrics: Arc<dyn MetricsRegistry>,
    pub agents: Arc<AgentRegistry>,
}

impl ChimeraCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        build: Arc<dyn BuildPort>,
        session: Arc<dyn SessionPort>,
        executor: Arc<dyn RemoteExecutorPort>,
        bus: Arc<dyn EventBusPort>,
        policy_gate: Arc<dyn PolicyGate>,
        metrics: Arc<dyn MetricsRegistry>,
        heartbeat_interval_seconds: u64,
    ) -> Self {
        Self {
            build,
            session,
            executor,
            bus,
            policy_gate,
            audit: Arc::new(AuditLog::default()),
            metrics,
            agents: Arc::new(AgentRegistry::new(heartbeat_interval_seconds)),
        }
    }

    #[instrument(skip(self))]
    pub async fn deploy_fleet(
        &self,
        subject_id: &str,
        config_path: ConfigPath,
        command: &str,
        session_name: SessionId,
        targets: &[Node],
    ) -> CoreResult<DeployFleetResult> {
        let result = deploy_fleet::execute(
            self.build.as_ref(),
            self.session.as_ref(),
            self.executor.as_ref(),
            self.bus.as_ref(),
            config_path,
            command,
            session_name,
            targets,
        )
        .await;

        match &result {
            Ok(outcome) => {
                self.metrics.increment_counter("chimera_deploy_fleet_runs_total");
                self.audit.record(AuditEntry::new(
                    subject_id,
                    "deploy_fleet",
                    if outcome.deployment.status.is_terminal()
                        && outcome.deployment.error_message.is_none()
                    {
                        AuditDecision::Completed
                    } else {
                        AuditDecision::Failed {
                            reason: outcome
                                .deployment
                                .error_message
                                .clone()
                                .unwrap_or_default(),
                        }
                    },
                ));
            }
            Err(err) => {
                self.audit.record(AuditEntry::new(
                    subject_id,
                    "deploy_fleet",
                    AuditDecision::Failed {
                        reason: err.to_string(),
                    },
                ));
            }
        }

        result
    }

    #[instrument(skip(self))]
    pub async fn rollback(
        &self,
        subject_id: &str,
        targets: &[Node],
        generation: Option<u64>,
    ) -> std::collections::BTreeMap<Node, RollbackOutcome> {
        let outcomes = rollback::execute(self.executor.as_ref(), self.bus.as_ref(), targets, generation).await;
        self.metrics.increment_counter("chimera_rollback_runs_total");
        let all_ok = outcomes.values().all(|o| matches!(o, RollbackOutcome::Ok));
        self.audit.record(AuditEntry::new(
            subject_id,
            "rollback",
            if all_ok {
                AuditDecision::Completed
            } else {
                AuditDecision::Failed {
                    reason: "one or more nodes failed to roll back".to_string(),
                }
            },
        ));
        outcomes
    }

    pub async fn run_autonomous_loop(
        &self,
        config: AutonomousLoopConfig,
        cancel: watch::Receiver<bool>,
    ) -> CoreResult<chimera_types::Fingerprint> {
        autonomous_loop::run(
            self.build.clone(),
            self.session.clone(),
            self.executor.clone(),
            self.bus.clone(),
            self.policy_gate.clone(),
            config,
            cancel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_eventbus::InProcessEventBus;
    use chimera_observability::InMemoryMetricsRegistry;
    use chimera_policy::PolicyEngineGate;
    use chimera_ports::fakes::{FakeBuildPort, FakeRemoteExecutorPort, FakeSessionPort};
    use chimera_types::Policy;

    fn core() -> ChimeraCore {
        ChimeraCore::new(
            Arc::new(FakeBuildPort::new()),
            Arc::new(FakeSessionPort::new()),
            Arc::new(FakeRemoteExecutorPort::new()),
            Arc::new(InProcessEventBus::new()),
            Arc::new(PolicyEngineGate::new(Policy::with_builtin_roles())),
            Arc::new(InMemoryMetricsRegistry::new()),
            5,
        )
    }

    #[tokio::test]
    async fn successful_deploy_is_audited_as_completed() {
        let core = core();
        let targets = vec![Node::parse("root@n1").unwrap()];
        core.deploy_fleet(
            "alice",
            ConfigPath::new("./flake.nix").unwrap(),
            "echo hi",
            SessionId::new("deploy-1").unwrap(),
            &targets,
        )
        .await
        .unwrap();

        let recent = core.audit.recent(1);
        assert_eq!(recent[0].operation, "deploy_fleet");
        assert_eq!(recent[0].decision, AuditDecision::Completed);
    }
}
