//! Numeric helpers shared by the projection, feasibility and scenario code
//!
//! Every ratio in the engine goes through [`safe_divide`]: a zero (or non-finite)
//! denominator resolves to 0 instead of NaN or infinity.

/// Return `value` if it is finite, otherwise `default`
pub fn sanitize(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Divide two numbers, returning 0 when the denominator is zero or either side is not finite
///
/// # Examples
/// ```
/// use runway_planner::math::safe_divide;
///
/// assert_eq!(safe_divide(10.0, 0.0), 0.0);
/// assert_eq!(safe_divide(10.0, 4.0), 2.5);
/// ```
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    safe_divide_or(numerator, denominator, 0.0)
}

/// [`safe_divide`] with an explicit fallback value
pub(crate) fn safe_divide_or(numerator: f64, denominator: f64, default: f64) -> f64 {
    let numerator = sanitize(numerator, 0.0);
    if !denominator.is_finite() || denominator == 0.0 {
        return default;
    }
    sanitize(numerator / denominator, default)
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    safe_divide(values.iter().sum(), values.len() as f64)
}

/// Population standard deviation, 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    sanitize(variance.sqrt(), 0.0)
}

/// Month-over-month growth rates for consecutive pairs with a positive previous value
pub fn period_growth_rates(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| safe_divide(pair[1] - pair[0], pair[0]))
        .collect()
}

/// Compound periodic growth rate between a start and end value
///
/// Returns 0 when the start value is not positive or there are no periods.
pub fn compound_growth_rate(start: f64, end: f64, periods: usize) -> f64 {
    if start <= 0.0 || periods == 0 || end < 0.0 {
        return 0.0;
    }
    sanitize((end / start).powf(1.0 / periods as f64) - 1.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_divide_zero_and_invalid() {
        assert_eq!(safe_divide(10.0, 0.0), 0.0);
        assert_eq!(safe_divide(-3.5, 0.0), 0.0);
        assert_eq!(safe_divide_or(10.0, 0.0, 5.0), 5.0);
        assert_eq!(safe_divide(10.0, f64::NAN), 0.0);
        assert_eq!(safe_divide(f64::NAN, 5.0), 0.0);
        assert_eq!(safe_divide(10.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_safe_divide_regular() {
        assert_eq!(safe_divide(10.0, 4.0), 2.5);
        assert_eq!(safe_divide(-9.0, 3.0), -3.0);
        assert!(safe_divide(f64::MAX, 1e-300).is_finite());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f64::NAN, 0.0), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY, 1.0), 1.0);
        assert_eq!(sanitize(-5.0, 0.0), -5.0);
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), 0.0);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_relative_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn test_growth_rates_skip_non_positive_base() {
        let rates = period_growth_rates(&[0.0, 100.0, 110.0, 121.0]);
        assert_eq!(rates.len(), 2);
        assert_relative_eq!(rates[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(rates[1], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_compound_growth_rate() {
        assert_relative_eq!(compound_growth_rate(100.0, 121.0, 2), 0.1, epsilon = 1e-12);
        assert_eq!(compound_growth_rate(0.0, 121.0, 2), 0.0);
        assert_eq!(compound_growth_rate(100.0, 121.0, 0), 0.0);
    }
}
