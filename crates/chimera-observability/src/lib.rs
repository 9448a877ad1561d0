//! Ambient observability: audit trail and metrics registry, carried
//! regardless of which features are in scope, since every use case logs
//! what it did.

pub mod audit;
pub mod metrics;

pub use audit::{AuditDecision, AuditEntry, AuditLog};
pub use metrics::{InMemoryMetricsRegistry, MetricsRegistry, PrometheusMetricsRegistry};
