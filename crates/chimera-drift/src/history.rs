//! Per-node consecutive-drift tracking, consulted by severity
//! classification.

use chimera_types::Node;
use dashmap::DashMap;

/// Tracks how many detection runs in a row found a given node non-congruent.
/// Reset to zero the moment a node is observed congruent again.
#[derive(Default)]
pub struct DriftHistory {
    consecutive: DashMap<Node, u32>,
}

impl DriftHistory {
    pub fn new() -> Self {
        Self {
            consecutive: DashMap::new(),
        }
    }

    /// Record this run's congruence observation for `node`, returning the
    /// updated consecutive-drift count.
    pub fn record(&self, node: &Node, is_congruent: bool) -> u32 {
        if is_congruent {
            self.consecutive.remove(node);
            0
        } else {
            let mut count = self.consecutive.entry(node.clone()).or_insert(0);
            *count += 1;
            *count
        }
    }

    pub fn consecutive_count(&self, node: &Node) -> u32 {
        self.consecutive.get(node).map(|c| *c).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn congruent_observation_resets_counter() {
        let history = DriftHistory::new();
        let node = Node::parse("root@n1").unwrap();
        assert_eq!(history.record(&node, false), 1);
        assert_eq!(history.record(&node, false), 2);
        assert_eq!(history.record(&node, true), 0);
        assert_eq!(history.consecutive_count(&node), 0);
    }
}
