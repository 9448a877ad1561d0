//! Cloud-provider node discovery and lifecycle.

use crate::error::PortResult;
use async_trait::async_trait;
use chimera_types::Node;
use std::collections::BTreeMap;

#[async_trait]
pub trait CloudProviderPort: Send + Sync {
    /// List nodes known to the provider, optionally narrowed by tag filters.
    async fn discover(&self, filters: Option<&BTreeMap<String, String>>) -> PortResult<Vec<Node>>;

    /// Provision a new node.
    async fn provision(&self, name: &str, instance_type: &str, region: &str, opts: &BTreeMap<String, String>) -> PortResult<Node>;

    /// Decommission a node, returning whether it existed.
    async fn decommission(&self, node: &Node) -> PortResult<bool>;

    /// Fetch provider-specific metadata for a node.
    async fn metadata(&self, node: &Node) -> PortResult<BTreeMap<String, String>>;
}
