//! Playbook engine: per-step authorize/execute/timeout/rollback state
//! machine.

use crate::context::{PlaybookContext, PreconditionRegistry};
use crate::executor::{required_permission, ActionExecutor};
use chimera_policy::PolicyGate;
use chimera_ports::EventBusPort;
use chimera_types::{DomainEvent, EventEnvelope, EventSource, Playbook, StepOutcome, StepResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a full playbook run.
#[derive(Debug, Clone)]
pub enum PlaybookRunOutcome {
    Skipped { reason: String },
    Completed { results: Vec<StepResult> },
    Failed { failed_step: String, results: Vec<StepResult> },
}

/// Run `playbook` to completion against `ctx`, authorizing each step
/// through `policy_gate`, executing actions via `executor`, and publishing
/// lifecycle events onto `bus`.
pub async fn run_playbook(
    playbook: &Playbook,
    ctx: &PlaybookContext,
    preconditions: &PreconditionRegistry,
    policy_gate: &dyn PolicyGate,
    executor: &dyn ActionExecutor,
    bus: &dyn EventBusPort,
) -> PlaybookRunOutcome {
    for precondition in &playbook.preconditions {
        if !preconditions.check(precondition, ctx) {
            let reason = format!("precondition not satisfied: {precondition}");
            bus.publish(vec![EventEnvelope::new(
                DomainEvent::PlaybookSkipped {
                    playbook_id: playbook.id.clone(),
                    reason: reason.clone(),
                },
                EventSource::Playbook,
            )])
            .await;
            return PlaybookRunOutcome::Skipped { reason };
        }
    }

    let mut results: Vec<StepResult> = Vec::new();
    let mut failed_step: Option<String> = None;

    for step in &playbook.steps {
        let permission = required_permission(&step.action);
        let decision = policy_gate.evaluate(&ctx.subject_id, permission).await;
        if decision.is_denied() {
            results.push(StepResult {
                step_id: step.id.clone(),
                outcome: StepOutcome::Denied,
                duration_ms: 0,
                detail: Some(format!("{decision:?}")),
            });
            failed_step = Some(step.id.clone());
            break;
        }

        let start = Instant::now();
        let outcome_result = tokio::time::timeout(
            Duration::from_secs(step.timeout_seconds),
            executor.execute(&ctx.node, &step.action),
        )
        .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome_result {
            Ok(Ok(())) => {
                results.push(StepResult {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Ok,
                    duration_ms,
                    detail: None,
                });
            }
            Ok(Err(cause)) => {
                results.push(StepResult {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Fail,
                    duration_ms,
                    detail: Some(cause),
                });
                if !step.continue_on_failure {
                    failed_step = Some(step.id.clone());
                    break;
                }
            }
            Err(_) => {
                results.push(StepResult {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Timeout,
                    duration_ms,
                    detail: Some(format!("step timed out after {}s", step.timeout_seconds)),
                });
                if !step.continue_on_failure {
                    failed_step = Some(step.id.clone());
                    break;
                }
            }
        }
    }

    if let Some(failed_step) = failed_step {
        roll_back_completed_steps(playbook, &results, ctx, executor, bus).await;
        bus.publish(vec![EventEnvelope::new(
            DomainEvent::PlaybookFailed {
                playbook_id: playbook.id.clone(),
                failed_step: failed_step.clone(),
            },
            EventSource::Playbook,
        )])
        .await;
        return PlaybookRunOutcome::Failed { failed_step, results };
    }

    bus.publish(vec![EventEnvelope::new(
        DomainEvent::PlaybookCompleted {
            playbook_id: playbook.id.clone(),
        },
        EventSource::Playbook,
    )])
    .await;
    PlaybookRunOutcome::Completed { results }
}

/// Walk completed steps in reverse, best-effort executing each step's
/// rollback action if one is defined. A rollback
/// failure is logged, never aborts the walk.
async fn roll_back_completed_steps(
    playbook: &Playbook,
    results: &[StepResult],
    ctx: &PlaybookContext,
    executor: &dyn ActionExecutor,
    bus: &dyn EventBusPort,
) {
    let completed_ids: Vec<&str> = results
        .iter()
        .filter(|r| r.outcome == StepOutcome::Ok)
        .map(|r| r.step_id.as_str())
        .collect();

    for step_id in completed_ids.iter().rev() {
        let Some(step) = playbook.steps.iter().find(|s| s.id == *step_id) else {
            continue;
        };
        let Some(rollback_action) = &step.rollback else {
            continue;
        };
        if let Err(cause) = executor.execute(&ctx.node, rollback_action).await {
            tracing::warn!(step_id = %step_id, cause = %cause, "rollback action failed, continuing walk");
        }
    }

    bus.publish(vec![EventEnvelope::new(
        DomainEvent::PlaybookRolledBack {
            playbook_id: playbook.id.clone(),
        },
        EventSource::Playbook,
    )])
    .await;
}

/// Convenience wrapper bundling an engine's collaborators behind `Arc`s so
/// callers (e.g. the autonomous loop) can hold one owned handle.
pub struct PlaybookEngine {
    pub policy_gate: Arc<dyn PolicyGate>,
    pub executor: Arc<dyn ActionExecutor>,
    pub bus: Arc<dyn EventBusPort>,
}

impl PlaybookEngine {
    pub fn new(
        policy_gate: Arc<dyn PolicyGate>,
        executor: Arc<dyn ActionExecutor>,
        bus: Arc<dyn EventBusPort>,
    ) -> Self {
        Self { policy_gate, executor, bus }
    }

    pub async fn run(
        &self,
        playbook: &Playbook,
        ctx: &PlaybookContext,
        preconditions: &PreconditionRegistry,
    ) -> PlaybookRunOutcome {
        run_playbook(
            playbook,
            ctx,
            preconditions,
            self.policy_gate.as_ref(),
            self.executor.as_ref(),
            self.bus.as_ref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chimera_eventbus::InProcessEventBus;
    use chimera_policy::PolicyDecision;
    use chimera_types::{Action, Node, Permission, PlaybookStep};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AllowGate;
    #[async_trait]
    impl PolicyGate for AllowGate {
        fn id(&self) -> &str {
            "allow"
        }
        async fn evaluate(&self, _subject_id: &str, _permission: Permission) -> PolicyDecision {
            PolicyDecision::Allow
        }
    }

    struct DenyGate;
    #[async_trait]
    impl PolicyGate for DenyGate {
        fn id(&self) -> &str {
            "deny"
        }
        async fn evaluate(&self, _subject_id: &str, _permission: Permission) -> PolicyDecision {
            PolicyDecision::Deny { reason: "no".into() }
        }
    }

    struct RecordingExecutor {
        fail_step: Option<&'static str>,
        rollback_calls: AtomicUsize,
    }

    #[async_trait]
    impl ActionExecutor for RecordingExecutor {
        async fn execute(&self, _node: &Node, action: &Action) -> Result<(), String> {
            match action {
                Action::RestartService { name } if Some(name.as_str()) == self.fail_step => {
                    Err("boom".to_string())
                }
                Action::Rollback { .. } => {
                    self.rollback_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                _ => Ok(()),
            }
        }
    }

    fn step(id: &str, fails_with: Option<Action>) -> PlaybookStep {
        PlaybookStep {
            id: id.to_string(),
            name: id.to_string(),
            action: Action::RestartService { name: id.to_string() },
            params: BTreeMap::new(),
            timeout_seconds: 5,
            rollback: fails_with,
            continue_on_failure: false,
        }
    }

    fn ctx() -> PlaybookContext {
        PlaybookContext::new(Node::parse("root@n1").unwrap(), "alice")
    }

    #[tokio::test]
    async fn completes_when_every_step_succeeds() {
        let playbook = Playbook::validate(
            "pb-1",
            "restart",
            semver::Version::new(1, 0, 0),
            vec![step("a", None)],
            vec![],
            vec![],
        )
        .unwrap();

        let bus = InProcessEventBus::new();
        let executor = RecordingExecutor { fail_step: None, rollback_calls: AtomicUsize::new(0) };
        let outcome = run_playbook(
            &playbook,
            &ctx(),
            &PreconditionRegistry::new(),
            &AllowGate,
            &executor,
            &bus,
        )
        .await;

        assert!(matches!(outcome, PlaybookRunOutcome::Completed { .. }));
        assert_eq!(bus.published_events().len(), 1);
    }

    #[tokio::test]
    async fn denied_step_aborts_without_executing() {
        let playbook = Playbook::validate(
            "pb-1",
            "restart",
            semver::Version::new(1, 0, 0),
            vec![step("a", None)],
            vec![],
            vec![],
        )
        .unwrap();

        let bus = InProcessEventBus::new();
        let executor = RecordingExecutor { fail_step: None, rollback_calls: AtomicUsize::new(0) };
        let outcome = run_playbook(
            &playbook,
            &ctx(),
            &PreconditionRegistry::new(),
            &DenyGate,
            &executor,
            &bus,
        )
        .await;

        match outcome {
            PlaybookRunOutcome::Failed { failed_step, results } => {
                assert_eq!(failed_step, "a");
                assert_eq!(results[0].outcome, StepOutcome::Denied);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_triggers_rollback_of_completed_steps() {
        let first = step("a", Some(Action::Rollback { generation: None }));
        let second = step("b", None);

        let playbook = Playbook::validate(
            "pb-1",
            "restart",
            semver::Version::new(1, 0, 0),
            vec![first, second],
            vec![],
            vec![],
        )
        .unwrap();

        let bus = InProcessEventBus::new();
        let executor = RecordingExecutor { fail_step: Some("b"), rollback_calls: AtomicUsize::new(0) };
        let outcome = run_playbook(
            &playbook,
            &ctx(),
            &PreconditionRegistry::new(),
            &AllowGate,
            &executor,
            &bus,
        )
        .await;

        match outcome {
            PlaybookRunOutcome::Failed { failed_step, .. } => assert_eq!(failed_step, "b"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(executor.rollback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsatisfied_precondition_skips_the_run() {
        let playbook = Playbook::validate(
            "pb-1",
            "restart",
            semver::Version::new(1, 0, 0),
            vec![step("a", None)],
            vec!["fleet-healthy".to_string()],
            vec![],
        )
        .unwrap();

        let bus = InProcessEventBus::new();
        let executor = RecordingExecutor { fail_step: None, rollback_calls: AtomicUsize::new(0) };
        let outcome = run_playbook(
            &playbook,
            &ctx(),
            &PreconditionRegistry::new(),
            &AllowGate,
            &executor,
            &bus,
        )
        .await;

        assert!(matches!(outcome, PlaybookRunOutcome::Skipped { .. }));
    }
}
