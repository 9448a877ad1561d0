//! Pure severity classification and blast-radius computation.

use chimera_types::DriftSeverity;

/// Classify a non-congruent node's severity from its production tag and
/// consecutive-drift streak.
pub fn classify_severity(is_production: bool, consecutive_drift_count: u32) -> DriftSeverity {
    if is_production && consecutive_drift_count >= 3 {
        DriftSeverity::Critical
    } else if is_production || consecutive_drift_count >= 3 {
        DriftSeverity::High
    } else if consecutive_drift_count >= 2 {
        DriftSeverity::Medium
    } else {
        DriftSeverity::Low
    }
}

/// Percentage of nodes that are non-congruent, rounded half-up to one
/// decimal place.
pub fn blast_radius_pct(non_congruent: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * non_congruent as f64 / total as f64;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_with_long_streak_is_critical() {
        assert_eq!(classify_severity(true, 3), DriftSeverity::Critical);
        assert_eq!(classify_severity(true, 5), DriftSeverity::Critical);
    }

    #[test]
    fn production_short_streak_is_high() {
        assert_eq!(classify_severity(true, 1), DriftSeverity::High);
    }

    #[test]
    fn non_production_long_streak_is_high() {
        assert_eq!(classify_severity(false, 3), DriftSeverity::High);
    }

    #[test]
    fn non_production_two_streak_is_medium() {
        assert_eq!(classify_severity(false, 2), DriftSeverity::Medium);
    }

    #[test]
    fn non_production_first_drift_is_low() {
        assert_eq!(classify_severity(false, 1), DriftSeverity::Low);
    }

    #[test]
    fn blast_radius_rounds_half_up_to_one_decimal() {
        // 1/3 = 33.333...% -> 33.3
        assert_eq!(blast_radius_pct(1, 3), 33.3);
        // 1/8 = 12.5% -> 12.5 already exact
        assert_eq!(blast_radius_pct(1, 8), 12.5);
        assert_eq!(blast_radius_pct(0, 10), 0.0);
    }

    #[test]
    fn blast_radius_is_monotonic_in_non_congruent_count() {
        let total = 20;
        let mut prev = blast_radius_pct(0, total);
        for non_congruent in 1..=total {
            let current = blast_radius_pct(non_congruent, total);
            assert!(current >= prev);
            prev = current;
        }
    }
}
