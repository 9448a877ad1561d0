//! Predictive analytics: a pure risk-score function over a node's drift
//! history and MTTR samples.
//!
//! Every input to [`analyze`] is a plain value — no port access, no clock
//! reads beyond the caller-supplied `now` — so a risk assessment is
//! reproducible from its inputs alone.

use chimera_types::DriftSeverity;
use chrono::{DateTime, Utc};

const DRIFT_FREQUENCY_NORM_C: f64 = 5.0;
const MTTR_NORM_C_MINUTES: f64 = 60.0;
const TREND_WINDOW: usize = 10;

/// A single historical drift observation.
#[derive(Debug, Clone, Copy)]
pub struct DriftEvent {
    pub occurred_at: DateTime<Utc>,
    pub severity: DriftSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskAssessment {
    pub drift_frequency: f64,
    pub severity_trend: f64,
    pub mttr_minutes: f64,
    pub risk_score: f64,
    pub band: RiskBand,
}

fn severity_rank(severity: DriftSeverity) -> f64 {
    match severity {
        DriftSeverity::Low => 1.0,
        DriftSeverity::Medium => 2.0,
        DriftSeverity::High => 3.0,
        DriftSeverity::Critical => 4.0,
    }
}

fn norm(value: f64, c: f64) -> f64 {
    (value / c).min(1.0)
}

/// Fractional ranks with ties averaged, the form Spearman's rho needs.
fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let average_rank = ((i + 1) + (j + 1)) as f64 / 2.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = average_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Spearman rank correlation between chronological position and severity,
/// normalized to `[-1, 1]`. Fewer than two points yields 0.0 (no trend).
fn severity_trend(events: &[DriftEvent]) -> f64 {
    let n = events.len();
    if n < 2 {
        return 0.0;
    }

    let time_values: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let severity_values: Vec<f64> = events.iter().map(|e| severity_rank(e.severity)).collect();

    let time_ranks = fractional_ranks(&time_values);
    let severity_ranks = fractional_ranks(&severity_values);

    let n_f = n as f64;
    let sum_d_sq: f64 = time_ranks
        .iter()
        .zip(severity_ranks.iter())
        .map(|(t, s)| (t - s).powi(2))
        .sum();

    1.0 - (6.0 * sum_d_sq) / (n_f * (n_f * n_f - 1.0))
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn band_for(risk_score: f64) -> RiskBand {
    if risk_score < 0.33 {
        RiskBand::Low
    } else if risk_score < 0.66 {
        RiskBand::Medium
    } else {
        RiskBand::High
    }
}

/// Compute a node's risk assessment from its drift history and recent MTTR
/// samples. `drift_events_last_7_days` must already be
/// filtered to the trailing 7-day window; `mttr_samples_last_30_days`
/// likewise to 30 days.
pub fn analyze(
    drift_events_last_7_days: &[DriftEvent],
    mttr_samples_last_30_days: &[f64],
) -> RiskAssessment {
    let drift_frequency = drift_events_last_7_days.len() as f64 / 7.0;

    let mut recent: Vec<DriftEvent> = drift_events_last_7_days.to_vec();
    recent.sort_by_key(|e| e.occurred_at);
    let windowed: Vec<DriftEvent> = recent
        .iter()
        .rev()
        .take(TREND_WINDOW)
        .rev()
        .copied()
        .collect();
    let trend = severity_trend(&windowed);

    let mttr_minutes = median(mttr_samples_last_30_days.to_vec());
    let mttr_component = if mttr_minutes.is_finite() {
        norm(mttr_minutes, MTTR_NORM_C_MINUTES)
    } else {
        0.0
    };

    let risk_score = (0.4 * norm(drift_frequency, DRIFT_FREQUENCY_NORM_C)
        + 0.3 * trend.max(0.0)
        + 0.3 * mttr_component)
    .clamp(0.0, 1.0);

    RiskAssessment {
        drift_frequency,
        severity_trend: trend,
        mttr_minutes,
        risk_score,
        band: band_for(risk_score),
    }
}
