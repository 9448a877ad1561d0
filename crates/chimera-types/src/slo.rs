//! SLO / error-budget value type.

use serde::{Deserialize, Serialize};

/// A service-level objective tracked over a resetting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slo {
    pub name: String,
    /// Target availability in `[0, 1]`.
    pub target: f64,
    pub window_seconds: u64,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub window_start: chrono::DateTime<chrono::Utc>,
}

impl Slo {
    pub fn new(name: impl Into<String>, target: f64, window_seconds: u64) -> Self {
        Self {
            name: name.into(),
            target: target.clamp(0.0, 1.0),
            window_seconds,
            total_requests: 0,
            failed_requests: 0,
            window_start: chrono::Utc::now(),
        }
    }

    pub fn availability(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            1.0 - (self.failed_requests as f64 / self.total_requests as f64)
        }
    }

    pub fn error_budget(&self) -> f64 {
        1.0 - self.target
    }

    pub fn budget_consumed(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        let error_budget = self.error_budget();
        if error_budget <= 0.0 {
            return if self.failed_requests > 0 {
                f64::INFINITY
            } else {
                0.0
            };
        }
        let failure_rate = self.failed_requests as f64 / self.total_requests as f64;
        failure_rate / error_budget
    }

    pub fn violated(&self) -> bool {
        self.budget_consumed() > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_with_no_requests_is_perfect() {
        let slo = Slo::new("checkout", 0.999, 60);
        assert_eq!(slo.availability(), 1.0);
        assert!(!slo.violated());
    }

    #[test]
    fn budget_consumed_accounts_for_error_budget_size() {
        let mut slo = Slo::new("checkout", 0.99, 60);
        slo.total_requests = 100;
        slo.failed_requests = 2; // failure rate 0.02, error budget 0.01
        assert!(slo.budget_consumed() > 1.0);
        assert!(slo.violated());
    }
}
