//! In-memory port doubles.
//!
//! Suitable for tests and for `chimera-cli`'s demonstration mode. Production
//! deployments wire real adapters against the traits in this crate instead.

use crate::build::BuildPort;
use crate::error::{PortFailure, PortResult};
use crate::remote_executor::RemoteExecutorPort;
use crate::session::SessionPort;
use async_trait::async_trait;
use chimera_types::{ConfigPath, Fingerprint, Node, SessionId};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Mutex;

/// Builds a deterministic fingerprint from the config path's contents and
/// tracks an incrementing build generation per path.
pub struct FakeBuildPort {
    generations: DashMap<ConfigPath, u64>,
}

impl FakeBuildPort {
    pub fn new() -> Self {
        Self {
            generations: DashMap::new(),
        }
    }
}

impl Default for FakeBuildPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildPort for FakeBuildPort {
    async fn build(&self, path: &ConfigPath) -> PortResult<Fingerprint> {
        let mut gen = self.generations.entry(path.clone()).or_insert(0);
        *gen += 1;
        let mut hasher = Sha256::new();
        hasher.update(path.as_str().as_bytes());
        hasher.update(gen.to_le_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Fingerprint::new(format!("fp-{}", &digest[..12]))
            .map_err(|e| PortFailure::AdapterFailed { port: "BuildPort", cause: e.to_string() })
    }

    async fn instantiate(&self, path: &ConfigPath) -> PortResult<String> {
        Ok(format!("/nix/store/fake-{}", path.as_str()))
    }

    async fn shell(&self, _path: &ConfigPath, cmd: &str) -> PortResult<String> {
        Ok(cmd.to_string())
    }
}

/// A single node's simulated remote state: its active fingerprint and a
/// history of prior generations for rollback.
struct NodeState {
    current: Option<Fingerprint>,
    history: Vec<Fingerprint>,
    reachable: bool,
}

/// Tracks per-node fingerprints in memory; nodes can be marked unreachable
/// to exercise partial-failure fan-out behavior in tests.
pub struct FakeRemoteExecutorPort {
    nodes: DashMap<Node, Mutex<NodeState>>,
}

impl FakeRemoteExecutorPort {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }

    pub fn mark_unreachable(&self, node: &Node) {
        self.nodes
            .entry(node.clone())
            .or_insert_with(|| {
                Mutex::new(NodeState {
                    current: None,
                    history: Vec::new(),
                    reachable: true,
                })
            })
            .lock()
            .unwrap()
            .reachable = false;
    }

    pub fn seed(&self, node: &Node, fingerprint: Fingerprint) {
        self.nodes.insert(
            node.clone(),
            Mutex::new(NodeState {
                current: Some(fingerprint),
                history: Vec::new(),
                reachable: true,
            }),
        );
    }
}

impl Default for FakeRemoteExecutorPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteExecutorPort for FakeRemoteExecutorPort {
    async fn sync_closure(&self, nodes: &[Node], fingerprint: &Fingerprint) -> PortResult<bool> {
        let mut any_failed = false;
        for node in nodes {
            let entry = self.nodes.entry(node.clone()).or_insert_with(|| {
                Mutex::new(NodeState {
                    current: None,
                    history: Vec::new(),
                    reachable: true,
                })
            });
            let mut state = entry.lock().unwrap();
            if !state.reachable {
                any_failed = true;
                continue;
            }
            if let Some(prev) = state.current.take() {
                state.history.push(prev);
            }
            state.current = Some(fingerprint.clone());
        }
        Ok(!any_failed)
    }

    async fn exec(&self, nodes: &[Node], _cmd: &str) -> PortResult<bool> {
        Ok(nodes.iter().all(|n| {
            self.nodes
                .get(n)
                .map(|s| s.lock().unwrap().reachable)
                .unwrap_or(true)
        }))
    }

    async fn current_fingerprint(&self, node: &Node) -> PortResult<Option<Fingerprint>> {
        match self.nodes.get(node) {
            None => Ok(None),
            Some(state) => {
                let state = state.lock().unwrap();
                if state.reachable {
                    Ok(state.current.clone())
                } else {
                    Ok(None)
                }
            }
        }
    }

    async fn rollback(&self, nodes: &[Node], generation: Option<u64>) -> PortResult<bool> {
        let mut any_failed = false;
        for node in nodes {
            match self.nodes.get(node) {
                None => {
                    any_failed = true;
                }
                Some(entry) => {
                    let mut state = entry.lock().unwrap();
                    if !state.reachable {
                        any_failed = true;
                        continue;
                    }
                    let target = match generation {
                        Some(idx) => state.history.get(idx as usize).cloned(),
                        None => state.history.last().cloned(),
                    };
                    match target {
                        Some(fp) => state.current = Some(fp),
                        None => any_failed = true,
                    }
                }
            }
        }
        Ok(!any_failed)
    }
}

/// In-memory persistent-session host.
pub struct FakeSessionPort {
    sessions: DashMap<SessionId, Vec<String>>,
}

impl FakeSessionPort {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl Default for FakeSessionPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionPort for FakeSessionPort {
    async fn create(&self, id: &SessionId) -> PortResult<bool> {
        if self.sessions.contains_key(id) {
            return Ok(false);
        }
        self.sessions.insert(id.clone(), Vec::new());
        Ok(true)
    }

    async fn list(&self) -> PortResult<Vec<SessionId>> {
        Ok(self.sessions.iter().map(|e| e.key().clone()).collect())
    }

    async fn kill(&self, id: &SessionId) -> PortResult<bool> {
        Ok(self.sessions.remove(id).is_some())
    }

    async fn run(&self, id: &SessionId, cmd: &str) -> PortResult<bool> {
        match self.sessions.get_mut(id) {
            Some(mut history) => {
                history.push(cmd.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn attach(&self, id: &SessionId) -> PortResult<String> {
        Ok(format!("tmux attach -t {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_build_port_is_deterministic_per_generation() {
        let port = FakeBuildPort::new();
        let path = ConfigPath::new("./flake.nix").unwrap();
        let fp1 = port.build(&path).await.unwrap();
        let fp2 = port.build(&path).await.unwrap();
        assert_ne!(fp1, fp2, "each build call advances the generation");
    }

    #[tokio::test]
    async fn remote_executor_partial_failure_when_one_node_unreachable() {
        let port = FakeRemoteExecutorPort::new();
        let good = Node::parse("root@n1").unwrap();
        let bad = Node::parse("root@n2").unwrap();
        port.mark_unreachable(&bad);

        let fp = Fingerprint::new("fp-AAA").unwrap();
        let ok = port.sync_closure(&[good.clone(), bad.clone()], &fp).await.unwrap();
        assert!(!ok, "sync reports failure when any node is unreachable");
        assert_eq!(port.current_fingerprint(&good).await.unwrap(), Some(fp));
        assert_eq!(port.current_fingerprint(&bad).await.unwrap(), None);
    }
}
