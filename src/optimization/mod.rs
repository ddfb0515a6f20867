//! Plan optimization strategies
//!
//! A strategy is a pure transform: it reads a series and returns a new one, and the
//! input is never modified. Strategies compose by feeding one's full output to the
//! next, so the order objectives are given in is observable in the result.

mod growth;
mod profitability;
mod recommendations;
mod runway;

pub use growth::GrowthStrategy;
pub use profitability::ProfitabilityStrategy;
pub use recommendations::{
    analyze, apply_automatic, apply_confirmed, Priority, Recommendation, RecommendationAction,
};
pub use runway::RunwayStrategy;

use crate::projection::ProjectionSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A transform reshaping a projection toward one objective
pub trait OptimizationStrategy {
    fn name(&self) -> &'static str;

    /// Return the optimized copy of `series`
    fn apply(&self, series: &ProjectionSeries) -> ProjectionSeries;
}

/// What a plan should be optimized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationObjective {
    PreserveRunway,
    MaximizeGrowth,
    MaximizeProfitability,
}

impl OptimizationObjective {
    /// Strategy with default parameters for this objective
    pub fn strategy(&self) -> Box<dyn OptimizationStrategy> {
        match self {
            OptimizationObjective::PreserveRunway => Box::new(RunwayStrategy::default()),
            OptimizationObjective::MaximizeGrowth => Box::new(GrowthStrategy::default()),
            OptimizationObjective::MaximizeProfitability => Box::new(ProfitabilityStrategy::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationObjective::PreserveRunway => "runway",
            OptimizationObjective::MaximizeGrowth => "growth",
            OptimizationObjective::MaximizeProfitability => "profitability",
        }
    }
}

impl fmt::Display for OptimizationObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationObjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "runway" | "preserve_runway" => Ok(OptimizationObjective::PreserveRunway),
            "growth" | "maximize_growth" => Ok(OptimizationObjective::MaximizeGrowth),
            "profitability" | "maximize_profitability" => Ok(OptimizationObjective::MaximizeProfitability),
            other => Err(format!(
                "unknown objective `{}` (expected runway, growth or profitability)",
                other
            )),
        }
    }
}

/// Apply objectives in order, each consuming the previous strategy's output
pub fn optimize(series: &ProjectionSeries, objectives: &[OptimizationObjective]) -> ProjectionSeries {
    objectives.iter().fold(series.clone(), |current, objective| {
        let strategy = objective.strategy();
        let optimized = strategy.apply(&current);
        log::info!(
            "Applied {} optimization: ending cash {:.2} -> {:.2}",
            strategy.name(),
            current.last().map(|m| m.cash_balance).unwrap_or(0.0),
            optimized.last().map(|m| m.cash_balance).unwrap_or(0.0)
        );
        optimized
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::assumptions::PlanAssumptions;
    use crate::projection::{ProjectionEngine, ProjectionSeries};

    pub fn base_series() -> ProjectionSeries {
        let mut a = PlanAssumptions::new(20_000.0, 100.0, 200.0, 4, 400_000.0);
        a.mrr_growth_rate = 0.1;
        a.churn_rate = 0.03;
        a.cac_target = 1_500.0;
        a.salary_per_employee = 9_000.0;
        a.office_rent_per_person = 600.0;
        ProjectionEngine::default().project(&a).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::base_series;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_objective_parsing() {
        assert_eq!("runway".parse::<OptimizationObjective>().unwrap(), OptimizationObjective::PreserveRunway);
        assert_eq!("Growth".parse::<OptimizationObjective>().unwrap(), OptimizationObjective::MaximizeGrowth);
        assert_eq!(
            "maximize_profitability".parse::<OptimizationObjective>().unwrap(),
            OptimizationObjective::MaximizeProfitability
        );
        assert!("valuation".parse::<OptimizationObjective>().is_err());
    }

    #[test]
    fn test_every_strategy_preserves_length_and_order() {
        let base = base_series();
        for objective in [
            OptimizationObjective::PreserveRunway,
            OptimizationObjective::MaximizeGrowth,
            OptimizationObjective::MaximizeProfitability,
        ] {
            let optimized = objective.strategy().apply(&base);
            assert_eq!(optimized.len(), 12);
            let months: Vec<u32> = optimized.months.iter().map(|m| m.month).collect();
            assert_eq!(months, (1..=12).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_strategies_do_not_modify_input() {
        let base = base_series();
        let snapshot = base.clone();
        let _ = optimize(
            &base,
            &[OptimizationObjective::PreserveRunway, OptimizationObjective::MaximizeGrowth],
        );
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_chained_order_is_observable() {
        let base = base_series();
        let runway_then_growth = optimize(
            &base,
            &[OptimizationObjective::PreserveRunway, OptimizationObjective::MaximizeGrowth],
        );
        let growth_then_runway = optimize(
            &base,
            &[OptimizationObjective::MaximizeGrowth, OptimizationObjective::PreserveRunway],
        );

        // Growth re-derives cloud cost from customers, so the 15% OPEX cut lands differently
        assert_ne!(runway_then_growth, growth_then_runway);
    }

    #[test]
    fn test_optimized_cash_chains() {
        let base = base_series();
        let optimized = optimize(
            &base,
            &[OptimizationObjective::MaximizeGrowth, OptimizationObjective::MaximizeProfitability],
        );

        let mut prev = optimized.context.starting_cash;
        for month in &optimized.months {
            assert_relative_eq!(month.cash_balance, prev + month.total_revenue - month.total_costs, epsilon = 1e-6);
            prev = month.cash_balance;
        }
    }

    #[test]
    fn test_no_objectives_is_identity() {
        let base = base_series();
        assert_eq!(optimize(&base, &[]), base);
    }
}
