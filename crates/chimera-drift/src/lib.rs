//! Drift detection: concurrent per-node congruence checks, severity
//! classification, blast-radius computation, and healing-plan assembly.

pub mod classify;
pub mod history;
pub mod plan;
pub mod service;

pub use classify::{blast_radius_pct, classify_severity};
pub use history::DriftHistory;
pub use plan::HealingPlan;
pub use service::detect;
