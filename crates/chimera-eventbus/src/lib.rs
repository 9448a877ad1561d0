//! In-process event bus: publish/subscribe over `DomainEvent` envelopes
//! keyed by event-type tag.
//!
//! Delivery within a single `publish` call is ordered — events are
//! delivered in the order passed, and for a given event, subscribed
//! handlers run in registration order. `publish` suspends until every
//! matching handler has completed; this is the bus's main suspension point.

use async_trait::async_trait;
use chimera_ports::{EventBusPort, EventHandler};
use chimera_types::EventEnvelope;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

fn event_type_name(event: &EventEnvelope) -> String {
    serde_json::to_value(&event.event)
        .ok()
        .and_then(|v| v.as_object().and_then(|o| o.keys().next().cloned()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// The event bus. Subscriptions are keyed by the `DomainEvent` variant name
/// (its serde tag), not by `EventSource` — a handler registers for
/// `"DriftDetected"`, not for `Drift`.
pub struct InProcessEventBus {
    subscribers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
    published: Mutex<Vec<EventEnvelope>>,
    publish_count: AtomicU64,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            published: Mutex::new(Vec::new()),
            publish_count: AtomicU64::new(0),
        }
    }

    /// Every event published so far, in publish order. Intended for the
    /// audit trail and for tests; not part of the `EventBusPort` contract.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published.lock().unwrap().clone()
    }

    pub fn publish_call_count(&self) -> u64 {
        self.publish_count.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers.get(event_type).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBusPort for InProcessEventBus {
    async fn publish(&self, events: Vec<EventEnvelope>) {
        self.publish_count.fetch_add(1, Ordering::SeqCst);
        for event in events {
            let type_name = event_type_name(&event);
            tracing::debug!(event_type = %type_name, severity = ?event.severity, "publishing event");

            // Snapshot the handler list so a subscribe() racing with this
            // publish cannot cause a handler to observe a partial view of
            // `subscribers` mid-iteration.
            let handlers = self.subscribers.get(&type_name).map(|v| v.clone());
            if let Some(handlers) = handlers {
                for handler in handlers {
                    handler.handle(&event).await;
                }
            }
            self.published.lock().unwrap().push(event);
        }
    }

    async fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.subscribers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}
