//! Statistical utility functions shared across modules
//!
//! Contains the replicate summary used by the chart aggregator and the
//! median used for chart reference lines.

use statrs::statistics::Statistics;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Standard deviation with population variance (divide by N, not N-1)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return if values.is_empty() { f64::NAN } else { 0.0 };
    }
    values.iter().population_std_dev()
}

/// Replicate summary: mean rounded to 2 decimals, population standard
/// deviation rounded to 3 decimals
pub fn mean_with_deviation(values: &[f64]) -> (f64, f64) {
    (
        round_to(mean(values), 2),
        round_to(population_std_dev(values), 3),
    )
}

/// Median of the finite values; NaN when none remain
pub fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std_dev_divides_by_n() {
        // sample std dev of [10, 20] would be 7.071
        assert!((population_std_dev(&[10.0, 20.0]) - 5.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[42.0]), 0.0);
    }

    #[test]
    fn test_mean_with_deviation_rounding() {
        let (m, d) = mean_with_deviation(&[1.0, 2.0, 2.0]);
        assert_eq!(m, 1.67);
        assert_eq!(d, 0.471);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-2.5551, 2), -2.56);
    }
}
