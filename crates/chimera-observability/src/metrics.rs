//! Metrics registry abstraction. The core depends only on the
//! [`MetricsRegistry`] trait; no Prometheus wire format is required inside
//! the core — [`PrometheusMetricsRegistry`] is the Prometheus-backed
//! implementation a binary wires in at the edge when it wants a scrape
//! endpoint.

use dashmap::DashMap;
use prometheus::{IntCounter, Registry};

/// Counter/gauge sink the core reports operational signals to.
pub trait MetricsRegistry: Send + Sync {
    fn increment_counter(&self, name: &str);
    fn set_gauge(&self, name: &str, value: f64);
}

/// Plain in-process registry with no external wire format, useful for tests
/// and for CLI demonstration runs.
#[derive(Default)]
pub struct InMemoryMetricsRegistry {
    counters: DashMap<String, u64>,
    gauges: DashMap<String, f64>,
}

impl InMemoryMetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map(|v| *v).unwrap_or(0)
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).map(|v| *v)
    }
}

impl MetricsRegistry for InMemoryMetricsRegistry {
    fn increment_counter(&self, name: &str) {
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
    }

    fn set_gauge(&self, name: &str, value: f64) {
        self.gauges.insert(name.to_string(), value);
    }
}

/// Prometheus-backed registry. Counters are created lazily on first use and
/// cached by name; gauges the same.
pub struct PrometheusMetricsRegistry {
    registry: Registry,
    counters: DashMap<String, IntCounter>,
    gauges: DashMap<String, prometheus::Gauge>,
}

impl PrometheusMetricsRegistry {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            counters: DashMap::new(),
            gauges: DashMap::new(),
        }
    }

    /// Render the current state in the Prometheus text exposition format.
    pub fn export(&self) -> String {
        use prometheus::{Encoder, TextEncoder};
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        String::from_utf8(buffer).unwrap_or_default()
    }

    fn counter_handle(&self, name: &str) -> IntCounter {
        if let Some(existing) = self.counters.get(name) {
            return existing.clone();
        }
        let counter = IntCounter::new(name, name).expect("valid prometheus counter name");
        self.registry
            .register(Box::new(counter.clone()))
            .expect("counter registered once per name");
        self.counters.insert(name.to_string(), counter.clone());
        counter
    }

    fn gauge_handle(&self, name: &str) -> prometheus::Gauge {
        if let Some(existing) = self.gauges.get(name) {
            return existing.clone();
        }
        let gauge = prometheus::Gauge::new(name, name).expect("valid prometheus gauge name");
        self.registry
            .register(Box::new(gauge.clone()))
            .expect("gauge registered once per name");
        self.gauges.insert(name.to_string(), gauge.clone());
        gauge
    }
}

impl Default for PrometheusMetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry for PrometheusMetricsRegistry {
    fn increment_counter(&self, name: &str) {
        self.counter_handle(name).inc();
    }

    fn set_gauge(&self, name: &str, value: f64) {
        self.gauge_handle(name).set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_registry_accumulates_counters() {
        let registry = InMemoryMetricsRegistry::new();
        registry.increment_counter("chimera_drift_detected_total");
        registry.increment_counter("chimera_drift_detected_total");
        assert_eq!(registry.counter("chimera_drift_detected_total"), 2);
    }

    #[test]
    fn prometheus_registry_exports_recorded_metrics() {
        let registry = PrometheusMetricsRegistry::new();
        registry.increment_counter("chimera_playbook_runs_total");
        registry.set_gauge("chimera_risk_score", 0.42);
        let exported = registry.export();
        assert!(exported.contains("chimera_playbook_runs_total"));
        assert!(exported.contains("chimera_risk_score"));
    }
}
