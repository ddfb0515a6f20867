//! Projection output: the 12-month series and its summary

use super::monthly::{CalculationWarning, MonthlyState};
use crate::math::{compound_growth_rate, mean};
use serde::{Deserialize, Serialize};

/// Plan-level values transforms need to re-derive monthly figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesContext {
    pub starting_cash: f64,
    pub price_per_customer: f64,
    pub cloud_cost_per_customer: f64,
    pub team_size: u32,
    /// Marketing operations spend as a share of MRR
    pub marketing_ops_ratio: f64,
    /// Planned CAC payback in months, used when no benchmark table applies
    pub cac_payback_target: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub context: SeriesContext,

    /// One entry per plan month, months strictly increasing from 1
    pub months: Vec<MonthlyState>,

    /// Zero-denominator fallbacks recorded while deriving metrics
    pub warnings: Vec<CalculationWarning>,
}

impl ProjectionSeries {
    /// Build a series and derive cash and metrics for every month
    pub fn new(context: SeriesContext, months: Vec<MonthlyState>) -> Self {
        let mut series = Self {
            context,
            months,
            warnings: Vec::new(),
        };
        series.recalculate();
        series
    }

    /// Replay cash and derived metrics from month 1 forward
    ///
    /// Must run after any change to a month's drivers so that every month's cash
    /// balance equals the previous balance plus that month's net cashflow.
    pub fn recalculate(&mut self) {
        self.warnings.clear();
        let mut cash = self.context.starting_cash;
        for month in &mut self.months {
            month.refresh(cash, &mut self.warnings);
            cash = month.cash_balance;
        }
        if !self.warnings.is_empty() {
            log::debug!("{} metric fallbacks recorded", self.warnings.len());
        }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Month by 1-indexed plan month
    pub fn month(&self, month: u32) -> Option<&MonthlyState> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn first(&self) -> Option<&MonthlyState> {
        self.months.first()
    }

    pub fn last(&self) -> Option<&MonthlyState> {
        self.months.last()
    }

    /// Cash balance before `index` (starting cash for the first month)
    pub fn cash_before(&self, index: usize) -> f64 {
        match index {
            0 => self.context.starting_cash,
            i => self.months.get(i - 1).map_or(self.context.starting_cash, |m| m.cash_balance),
        }
    }

    pub fn revenue(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.total_revenue).collect()
    }

    /// Lowest finite runway across the plan, `None` if no month burns cash
    pub fn min_finite_runway(&self) -> Option<f64> {
        self.months
            .iter()
            .filter_map(|m| m.runway.finite())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let total_revenue: f64 = self.months.iter().map(|m| m.total_revenue).sum();
        let total_costs: f64 = self.months.iter().map(|m| m.total_costs).sum();
        let total_opex: f64 = self.months.iter().map(|m| m.total_opex).sum();
        let total_capex: f64 = self.months.iter().map(|m| m.total_capex).sum();
        let customers_acquired: f64 = self.months.iter().map(|m| m.new_customers).sum();

        let ending_mrr = self.last().map(|m| m.mrr).unwrap_or(0.0);
        let ending_customers = self.last().map(|m| m.customers).unwrap_or(0.0);
        let ending_cash = self.last().map(|m| m.cash_balance).unwrap_or(self.context.starting_cash);

        let avg_monthly_growth = match (self.first(), self.last()) {
            (Some(first), Some(last)) if self.len() > 1 => {
                compound_growth_rate(first.mrr, last.mrr, self.len() - 1)
            }
            _ => 0.0,
        };

        let positive_ratios: Vec<f64> = self
            .months
            .iter()
            .map(|m| m.ltv_cac_ratio)
            .filter(|r| *r > 0.0)
            .collect();

        let worst_deficit = self
            .months
            .iter()
            .map(|m| m.net_cashflow)
            .fold(0.0_f64, f64::min);

        PlanSummary {
            total_months: self.len() as u32,
            total_revenue,
            total_opex,
            total_capex,
            total_costs,
            total_profit: total_revenue - total_costs,
            customers_acquired,
            ending_mrr,
            ending_customers,
            ending_cash,
            avg_monthly_growth,
            avg_ltv_cac_ratio: mean(&positive_ratios),
            avg_burn_rate: mean(&self.months.iter().map(|m| m.burn_rate).collect::<Vec<_>>()),
            min_runway: self.min_finite_runway(),
            breakeven_month: self.months.iter().find(|m| m.net_cashflow >= 0.0).map(|m| m.month),
            peak_cash_requirement: worst_deficit.abs() * 3.0,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_months: u32,
    pub total_revenue: f64,
    pub total_opex: f64,
    pub total_capex: f64,
    pub total_costs: f64,
    pub total_profit: f64,
    pub customers_acquired: f64,
    pub ending_mrr: f64,
    pub ending_customers: f64,
    pub ending_cash: f64,
    /// Compound monthly MRR growth from the first to the last month
    pub avg_monthly_growth: f64,
    /// Average over months with a positive LTV/CAC
    pub avg_ltv_cac_ratio: f64,
    pub avg_burn_rate: f64,
    /// `None` when no month burns cash
    pub min_runway: Option<f64>,
    /// First month with non-negative net cashflow
    pub breakeven_month: Option<u32>,
    /// Three months of the worst monthly deficit
    pub peak_cash_requirement: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context() -> SeriesContext {
        SeriesContext {
            starting_cash: 100_000.0,
            price_per_customer: 100.0,
            cloud_cost_per_customer: 10.0,
            team_size: 3,
            marketing_ops_ratio: 0.05,
            cac_payback_target: 12.0,
        }
    }

    fn month(n: u32, mrr: f64, salaries: f64) -> MonthlyState {
        let mut m = MonthlyState::new(n);
        m.mrr = mrr;
        m.customers = mrr / 100.0;
        m.churn_rate = 0.05;
        m.cac = 500.0;
        m.opex.salaries = salaries;
        m
    }

    #[test]
    fn test_recalculate_chains_cash() {
        let series = ProjectionSeries::new(
            context(),
            vec![month(1, 10_000.0, 30_000.0), month(2, 12_000.0, 30_000.0), month(3, 40_000.0, 30_000.0)],
        );

        assert_relative_eq!(series.months[0].cash_balance, 80_000.0);
        assert_relative_eq!(series.months[1].cash_balance, 62_000.0);
        assert_relative_eq!(series.months[2].cash_balance, 72_000.0);
        assert_relative_eq!(series.cash_before(2), 62_000.0);
        assert!(series.months[2].runway.is_unlimited());
        assert_eq!(series.min_finite_runway(), Some(80_000.0 / 18_000.0));
    }

    #[test]
    fn test_summary() {
        let series = ProjectionSeries::new(
            context(),
            vec![month(1, 10_000.0, 30_000.0), month(2, 12_000.0, 30_000.0), month(3, 40_000.0, 30_000.0)],
        );
        let summary = series.summary();

        assert_eq!(summary.total_months, 3);
        assert_relative_eq!(summary.total_revenue, 62_000.0);
        assert_relative_eq!(summary.total_profit, -28_000.0);
        assert_relative_eq!(summary.ending_cash, 72_000.0);
        assert_relative_eq!(summary.avg_monthly_growth, 1.0);
        assert_relative_eq!(summary.peak_cash_requirement, 60_000.0);
        assert_eq!(summary.breakeven_month, Some(3));
    }

    #[test]
    fn test_empty_series_summary() {
        let series = ProjectionSeries::new(context(), Vec::new());
        let summary = series.summary();

        assert!(series.is_empty());
        assert_eq!(summary.total_months, 0);
        assert_eq!(summary.ending_cash, 100_000.0);
        assert_eq!(summary.min_runway, None);
        assert_eq!(summary.breakeven_month, None);
    }
}
