//! The policy gate trait and a composed gate for chaining evaluators, with
//! a single evaluation mode fixed to deny-precedence: the engine's
//! authorization semantics are not configurable, since a deny always wins.

use crate::authorize::authorize;
use crate::decision::PolicyDecision;
use async_trait::async_trait;
use chimera_types::{Permission, Policy};
use std::sync::Arc;

/// A single policy evaluator. Most deployments need only the built-in
/// [`PolicyEngineGate`], but the trait lets additional gates (rate limits,
/// maintenance windows) be chained in without the core depending on their
/// concrete types.
#[async_trait]
pub trait PolicyGate: Send + Sync {
    fn id(&self) -> &str;

    async fn evaluate(&self, subject_id: &str, permission: Permission) -> PolicyDecision;
}

/// Evaluates the core `Policy` entity via [`authorize`].
pub struct PolicyEngineGate {
    policy: Policy,
}

impl PolicyEngineGate {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl PolicyGate for PolicyEngineGate {
    fn id(&self) -> &str {
        "policy-engine"
    }

    async fn evaluate(&self, subject_id: &str, permission: Permission) -> PolicyDecision {
        if authorize(&self.policy, subject_id, permission) {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny {
                reason: format!("{subject_id} lacks {permission:?}"),
            }
        }
    }
}

/// Chains gates with deny-precedence: the first gate to deny wins, and all
/// gates must allow for the composed decision to allow.
pub struct ComposedGate {
    gates: Vec<Arc<dyn PolicyGate>>,
}

impl ComposedGate {
    pub fn new() -> Self {
        Self { gates: Vec::new() }
    }

    pub fn add_gate(mut self, gate: Arc<dyn PolicyGate>) -> Self {
        self.gates.push(gate);
        self
    }
}

impl Default for ComposedGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyGate for ComposedGate {
    fn id(&self) -> &str {
        "composed"
    }

    async fn evaluate(&self, subject_id: &str, permission: Permission) -> PolicyDecision {
        for gate in &self.gates {
            let decision = gate.evaluate(subject_id, permission).await;
            if decision.is_denied() {
                return decision;
            }
        }
        PolicyDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_types::Policy;

    #[tokio::test]
    async fn composed_gate_stops_at_first_deny() {
        let policy = Policy::with_builtin_roles()
            .bind("alice", "admin")
            .deny("alice", Permission::Rollback);
        let engine = Arc::new(PolicyEngineGate::new(policy));
        let composed = ComposedGate::new().add_gate(engine);

        let decision = composed.evaluate("alice", Permission::Rollback).await;
        assert!(decision.is_denied());
    }
}
