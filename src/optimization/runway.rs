//! Runway preservation: spend less, acquire more efficiently

use super::OptimizationStrategy;
use crate::projection::ProjectionSeries;

/// Cut operating spend and acquisition cost in every month
#[derive(Debug, Clone)]
pub struct RunwayStrategy {
    /// Multiplier applied to every OPEX category
    pub opex_factor: f64,
    /// Multiplier applied to CAC and the marketing and sales budgets
    pub acquisition_factor: f64,
}

impl Default for RunwayStrategy {
    fn default() -> Self {
        Self {
            opex_factor: 0.85,
            acquisition_factor: 0.9,
        }
    }
}

impl OptimizationStrategy for RunwayStrategy {
    fn name(&self) -> &'static str {
        "runway"
    }

    fn apply(&self, series: &ProjectionSeries) -> ProjectionSeries {
        let mut optimized = series.clone();

        for month in &mut optimized.months {
            month.opex = month.opex.scaled(self.opex_factor);
            month.cac *= self.acquisition_factor;
            month.marketing_budget *= self.acquisition_factor;
            month.sales_budget *= self.acquisition_factor;
        }

        optimized.recalculate();
        optimized
    }
}
