//! Event bus port — publish/subscribe over `DomainEvent` envelopes.

use async_trait::async_trait;
use chimera_types::EventEnvelope;
use std::sync::Arc;

/// A subscriber handler invoked once per published event whose type it was
/// registered for.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &EventEnvelope);
}

#[async_trait]
pub trait EventBusPort: Send + Sync {
    /// Publish a batch of events. Delivery to subscribers of a given event
    /// happens in subscription order; this call suspends until every
    /// matching handler has completed.
    async fn publish(&self, events: Vec<EventEnvelope>);

    /// Register a handler for events whose discriminant name equals `event_type`.
    async fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);
}
