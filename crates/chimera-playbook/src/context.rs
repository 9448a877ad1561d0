//! Execution context a playbook run is evaluated against.

use chimera_types::Node;
use std::collections::HashMap;

/// The mutable facts a precondition predicate may read. Kept intentionally
/// small and closed: preconditions are pure functions of this snapshot, not
/// of live port state, so a run's precondition check is reproducible.
#[derive(Debug, Clone)]
pub struct PlaybookContext {
    pub node: Node,
    pub subject_id: String,
    pub facts: HashMap<String, String>,
}

impl PlaybookContext {
    pub fn new(node: Node, subject_id: impl Into<String>) -> Self {
        Self {
            node,
            subject_id: subject_id.into(),
            facts: HashMap::new(),
        }
    }

    pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.facts.insert(key.into(), value.into());
        self
    }
}

/// A named precondition predicate, registered by the caller and referenced
/// by name from `Playbook::preconditions`. An unregistered name fails
/// closed: the precondition is treated as not satisfied.
pub type Precondition = Box<dyn Fn(&PlaybookContext) -> bool + Send + Sync>;

#[derive(Default)]
pub struct PreconditionRegistry {
    predicates: HashMap<String, Precondition>,
}

impl PreconditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, predicate: Precondition) -> Self {
        self.predicates.insert(name.into(), predicate);
        self
    }

    pub fn check(&self, name: &str, ctx: &PlaybookContext) -> bool {
        match self.predicates.get(name) {
            Some(predicate) => predicate(ctx),
            None => false,
        }
    }
}
