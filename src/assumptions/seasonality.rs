//! Monthly seasonality curve

use serde::{Deserialize, Serialize};

/// Default B2B SaaS seasonality, one factor per calendar month (Jan..Dec)
pub const DEFAULT_SEASONALITY: [f64; 12] = [
    0.90, // January - slow after the holidays
    0.95, // February
    1.10, // March - quarter end
    1.00, // April
    0.95, // May
    0.90, // June
    0.85, // July - vacations
    0.90, // August
    1.20, // September
    1.10, // October
    1.00, // November
    1.30, // December - year end
];

/// Seasonality multipliers applied to growth rates, indexed by month 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seasonality {
    factors: [f64; 12],
}

impl Seasonality {
    pub fn new(factors: [f64; 12]) -> Self {
        Self { factors }
    }

    /// Flat curve (every factor 1.0)
    pub fn flat() -> Self {
        Self { factors: [1.0; 12] }
    }

    /// Factor for a 1-indexed month; months outside 1..=12 wrap around the year
    pub fn factor(&self, month: u32) -> f64 {
        let idx = (month.max(1) - 1) as usize % 12;
        self.factors[idx]
    }

    pub fn factors(&self) -> &[f64; 12] {
        &self.factors
    }
}

impl Default for Seasonality {
    fn default() -> Self {
        Self::new(DEFAULT_SEASONALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve_is_exact() {
        let curve = Seasonality::default();
        let expected = [0.90, 0.95, 1.10, 1.00, 0.95, 0.90, 0.85, 0.90, 1.20, 1.10, 1.00, 1.30];
        for (month, factor) in (1..=12).zip(expected) {
            assert_eq!(curve.factor(month), factor);
        }
    }

    #[test]
    fn test_factor_wraps() {
        let curve = Seasonality::default();
        assert_eq!(curve.factor(13), curve.factor(1));
        assert_eq!(curve.factor(0), curve.factor(1));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let json = serde_json::to_string(&Seasonality::flat()).unwrap();
        assert!(json.starts_with('['));
        let parsed: Seasonality = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Seasonality::flat());
    }
}
