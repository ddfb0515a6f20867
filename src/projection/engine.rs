//! Core projection engine for 12-month SaaS financial plans

use super::monthly::{CalculationWarning, MonthlyState, OpexBreakdown};
use super::series::{ProjectionSeries, SeriesContext};
use super::state::ProjectionState;
use crate::assumptions::{CapexBreakdown, PlanAssumptions, PLAN_MONTHS};
use crate::error::PlanError;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Monthly CAC reduction from acquisition learning
    pub cac_learning_rate: f64,

    /// CAC never falls below this share of the target
    pub cac_floor_ratio: f64,

    /// Sales budget as a share of the marketing budget
    pub sales_budget_ratio: f64,

    /// Monthly salary inflation, compounded by plan month
    pub salary_inflation: f64,

    /// Month of the first planned hire
    pub first_hire_month: u32,

    /// Months between subsequent hires
    pub hire_interval_months: u32,

    /// General overhead pool as a share of salaries
    pub overhead_ratio: f64,

    /// Marketing operations spend as a share of MRR
    pub marketing_ops_ratio: f64,

    pub gross_margin: f64,

    /// Quarterly CAPEX per head when no budget is set
    pub auto_capex_per_head: f64,

    /// Months over which the CAPEX budget is front-loaded
    pub capex_front_loaded_months: u32,

    /// Share of the CAPEX budget spread over the remaining months
    pub capex_tail_ratio: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            cac_learning_rate: 0.05,
            cac_floor_ratio: 0.5,
            sales_budget_ratio: 0.3,
            salary_inflation: 0.02,
            first_hire_month: 6,
            hire_interval_months: 3,
            overhead_ratio: 0.15,
            marketing_ops_ratio: 0.05,
            gross_margin: 0.8,
            auto_capex_per_head: 50_000.0,
            capex_front_loaded_months: 6,
            capex_tail_ratio: 0.1,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a plan month by month
    ///
    /// Assumptions are validated up front; nothing is computed for rejected input.
    pub fn project(&self, assumptions: &PlanAssumptions) -> Result<ProjectionSeries, PlanError> {
        assumptions.validate()?;

        let mut state = ProjectionState::from_assumptions(assumptions);
        let mut months = Vec::with_capacity(PLAN_MONTHS as usize);
        let mut warnings = Vec::new();

        for _month in 1..=PLAN_MONTHS {
            state.advance_month();

            let row = self.calculate_month(assumptions, &state, &mut warnings);
            log::debug!(
                "Month {}: mrr={:.2} customers={:.2} net={:.2} cash={:.2}",
                row.month,
                row.mrr,
                row.customers,
                row.net_cashflow,
                row.cash_balance
            );

            state.close_month(row.mrr, row.customers, row.cash_balance);
            months.push(row);
        }

        let series = ProjectionSeries {
            context: SeriesContext {
                starting_cash: assumptions.starting_cash,
                price_per_customer: assumptions.price_per_customer,
                cloud_cost_per_customer: assumptions.cloud_cost_per_customer,
                team_size: assumptions.team_size,
                marketing_ops_ratio: self.config.marketing_ops_ratio,
                cac_payback_target: assumptions.cac_payback_target,
            },
            months,
            warnings,
        };

        log::info!(
            "Projected `{}` over {} months: ending MRR {:.2}, ending cash {:.2}, {} warnings",
            assumptions.plan_name,
            series.len(),
            series.last().map(|m| m.mrr).unwrap_or(0.0),
            series.last().map(|m| m.cash_balance).unwrap_or(assumptions.starting_cash),
            series.warnings.len()
        );

        Ok(series)
    }

    /// Calculate a single month from the previous month's closing state
    fn calculate_month(
        &self,
        assumptions: &PlanAssumptions,
        state: &ProjectionState,
        warnings: &mut Vec<CalculationWarning>,
    ) -> MonthlyState {
        let month = state.projection_month;
        let mut row = MonthlyState::new(month);

        row.seasonality_factor = assumptions.seasonality_factor(month);
        row.churn_rate = assumptions.churn_rate;
        row.expansion_rate = assumptions.expansion_rate;
        row.gross_margin = self.config.gross_margin;

        self.calculate_customers(assumptions, state, &mut row);
        self.calculate_revenue(assumptions, state, &mut row);
        self.calculate_acquisition(assumptions, &mut row);
        self.calculate_opex(assumptions, &mut row);
        self.calculate_capex(assumptions, &mut row);

        row.refresh(state.cash_balance, warnings);
        row
    }

    /// Churn is taken from last month's base before growth applies to what is left
    fn calculate_customers(&self, assumptions: &PlanAssumptions, state: &ProjectionState, row: &mut MonthlyState) {
        if state.is_first_month() {
            row.customers = assumptions.starting_customers;
            return;
        }

        let churned = state.prev_customers * assumptions.churn_rate;
        let retained = state.prev_customers - churned;
        let new = retained * assumptions.customer_growth_rate * row.seasonality_factor;

        row.churned_customers = churned;
        row.new_customers = new;
        row.customers = retained + new;
    }

    fn calculate_revenue(&self, assumptions: &PlanAssumptions, state: &ProjectionState, row: &mut MonthlyState) {
        if state.is_first_month() {
            row.mrr = assumptions.starting_mrr;
            return;
        }

        let prev = state.prev_mrr;
        row.applied_growth_rate = assumptions.mrr_growth_rate * row.seasonality_factor;
        row.expansion_revenue = prev * assumptions.expansion_rate;
        row.churned_revenue = prev * assumptions.churn_rate;
        row.new_customer_revenue = (row.customers - state.prev_customers) * assumptions.price_per_customer;

        row.mrr = prev * (1.0 + row.applied_growth_rate) + row.expansion_revenue - row.churned_revenue
            + row.new_customer_revenue;
    }

    /// CAC improves linearly with experience down to a floor
    fn calculate_acquisition(&self, assumptions: &PlanAssumptions, row: &mut MonthlyState) {
        let target = assumptions.cac_target;
        let learned = target * (1.0 - self.config.cac_learning_rate * (row.month - 1) as f64);
        row.cac = learned.max(target * self.config.cac_floor_ratio);
        row.marketing_budget = row.cac * row.new_customers;
        row.sales_budget = row.marketing_budget * self.config.sales_budget_ratio;
    }

    fn calculate_opex(&self, assumptions: &PlanAssumptions, row: &mut MonthlyState) {
        row.headcount = assumptions.team_size + self.hires_by(row.month);
        let headcount = row.headcount as f64;

        let inflation = (1.0 + self.config.salary_inflation).powi(row.month as i32);
        let salaries = headcount * assumptions.salary_per_employee * inflation;

        row.opex = OpexBreakdown {
            salaries,
            office_rent: headcount * assumptions.office_rent_per_person,
            cloud: row.customers * assumptions.cloud_cost_per_customer,
            marketing_ops: row.mrr * self.config.marketing_ops_ratio,
            ..OpexBreakdown::default()
        }
        .with_overhead_pool(salaries * self.config.overhead_ratio);
    }

    fn calculate_capex(&self, assumptions: &PlanAssumptions, row: &mut MonthlyState) {
        let month = row.month;
        let front = self.config.capex_front_loaded_months;

        let planned = match assumptions.capex_budget {
            Some(budget) if budget > 0.0 => {
                if month <= front {
                    budget / front as f64
                } else {
                    let tail_months = PLAN_MONTHS.saturating_sub(front).max(1);
                    budget * self.config.capex_tail_ratio / tail_months as f64
                }
            }
            _ if month % 3 == 0 => assumptions.team_size as f64 * self.config.auto_capex_per_head,
            _ => 0.0,
        };

        row.capex = CapexBreakdown::split(planned + assumptions.scheduled_capex(month));
    }

    /// Cumulative planned hires by `month`
    fn hires_by(&self, month: u32) -> u32 {
        let first = self.config.first_hire_month;
        if first == 0 || month < first {
            return 0;
        }
        match self.config.hire_interval_months {
            0 => 1,
            interval => (month - first) / interval + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{CapexItem, Seasonality};
    use approx::assert_relative_eq;

    fn test_assumptions() -> PlanAssumptions {
        let mut a = PlanAssumptions::new(10_000.0, 50.0, 200.0, 5, 500_000.0);
        a.mrr_growth_rate = 0.1;
        a.churn_rate = 0.02;
        a.cac_target = 800.0;
        a.salary_per_employee = 8_000.0;
        a.office_rent_per_person = 500.0;
        a
    }

    fn project(a: &PlanAssumptions) -> ProjectionSeries {
        ProjectionEngine::default().project(a).unwrap()
    }

    #[test]
    fn test_projection_runs() {
        let series = project(&test_assumptions());

        assert_eq!(series.len(), 12);
        for (i, month) in series.months.iter().enumerate() {
            assert_eq!(month.month, i as u32 + 1);
        }
    }

    #[test]
    fn test_first_month_keeps_starting_position() {
        let series = project(&test_assumptions());
        let first = &series.months[0];

        assert_eq!(first.mrr, 10_000.0);
        assert_eq!(first.customers, 50.0);
        assert_eq!(first.new_customers, 0.0);
        assert_eq!(first.applied_growth_rate, 0.0);
    }

    #[test]
    fn test_churn_applies_before_growth() {
        let a = test_assumptions();
        let series = project(&a);
        let m2 = &series.months[1];

        let retained = 50.0 - 50.0 * 0.02;
        let expected_new = retained * a.customer_growth_rate * 0.95;
        assert_relative_eq!(m2.churned_customers, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m2.new_customers, expected_new, epsilon = 1e-12);
        assert_relative_eq!(m2.customers, retained + expected_new, epsilon = 1e-12);
    }

    #[test]
    fn test_second_month_revenue() {
        let a = test_assumptions();
        let series = project(&a);
        let m2 = &series.months[1];

        let customer_delta = m2.customers - 50.0;
        let expected = 10_000.0 * (1.0 + 0.1 * 0.95) + 10_000.0 * 0.1 - 10_000.0 * 0.02 + customer_delta * 200.0;
        assert_relative_eq!(m2.mrr, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_cash_balance_chains() {
        let a = test_assumptions();
        let series = project(&a);

        let mut prev = a.starting_cash;
        for month in &series.months {
            assert_relative_eq!(month.cash_balance, prev + month.total_revenue - month.total_costs, epsilon = 1e-6);
            assert_relative_eq!(month.total_costs, month.total_opex + month.total_capex, epsilon = 1e-9);
            prev = month.cash_balance;
        }
    }

    #[test]
    fn test_runway_unlimited_iff_no_burn() {
        let series = project(&test_assumptions());

        for (i, month) in series.months.iter().enumerate() {
            if month.net_cashflow >= 0.0 {
                assert!(month.runway.is_unlimited());
            } else {
                let expected = series.cash_before(i).max(0.0) / month.net_cashflow.abs();
                let runway = month.runway.finite().unwrap();
                assert_relative_eq!(runway, expected, epsilon = 1e-9);
                assert!(runway >= 0.0);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = test_assumptions();
        assert_eq!(project(&a), project(&a));
    }

    #[test]
    fn test_cac_learning_curve_has_floor() {
        let config = ProjectionConfig {
            cac_learning_rate: 0.2,
            ..Default::default()
        };
        let series = ProjectionEngine::new(config).project(&test_assumptions()).unwrap();

        assert_eq!(series.months[0].cac, 800.0);
        assert_relative_eq!(series.months[1].cac, 640.0);
        assert_eq!(series.months[11].cac, 400.0);
    }

    #[test]
    fn test_any_config_projects_full_year() {
        let config = ProjectionConfig {
            capex_front_loaded_months: 20,
            hire_interval_months: 1,
            ..ProjectionConfig::default()
        };
        let mut assumptions = test_assumptions();
        assumptions.capex_budget = Some(60_000.0);
        let series = ProjectionEngine::new(config).project(&assumptions).unwrap();

        assert_eq!(series.len(), PLAN_MONTHS as usize);
        let months: Vec<u32> = series.months.iter().map(|m| m.month).collect();
        assert_eq!(months, (1..=PLAN_MONTHS).collect::<Vec<_>>());
    }

    #[test]
    fn test_hiring_plan() {
        let series = project(&test_assumptions());
        let headcount: Vec<u32> = series.months.iter().map(|m| m.headcount).collect();

        assert_eq!(headcount, vec![5, 5, 5, 5, 5, 6, 6, 6, 7, 7, 7, 8]);
        assert_relative_eq!(series.months[0].opex.salaries, 5.0 * 8_000.0 * 1.02, epsilon = 1e-9);
        assert_relative_eq!(series.months[0].opex.office_rent, 2_500.0);
    }

    #[test]
    fn test_overhead_pool_split() {
        let series = project(&test_assumptions());
        let opex = &series.months[0].opex;
        let pool = opex.salaries * 0.15;

        assert_relative_eq!(opex.software_subscriptions, pool * 0.3, epsilon = 1e-9);
        assert_relative_eq!(opex.legal_accounting, pool * 0.2, epsilon = 1e-9);
        assert_relative_eq!(opex.other_opex, pool * 0.5, epsilon = 1e-9);
        assert_relative_eq!(opex.marketing_ops, 500.0, epsilon = 1e-9);
        assert_relative_eq!(opex.cloud, 50.0 * 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quarterly_capex_without_budget() {
        let series = project(&test_assumptions());

        assert_eq!(series.months[0].total_capex, 0.0);
        assert_relative_eq!(series.months[2].total_capex, 250_000.0, epsilon = 1e-6);
        assert_relative_eq!(series.months[11].total_capex, 250_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_budgeted_capex_with_scheduled_items() {
        let mut a = test_assumptions();
        a.capex_budget = Some(60_000.0);
        a.capex_items.push(CapexItem::new("servers", 8, 5_000.0));
        let series = project(&a);

        assert_relative_eq!(series.months[0].total_capex, 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(series.months[6].total_capex, 1_000.0, epsilon = 1e-9);
        assert_relative_eq!(series.months[7].total_capex, 6_000.0, epsilon = 1e-9);
        assert_relative_eq!(series.months[0].capex.equipment, 6_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_seasonality() {
        let mut a = test_assumptions();
        a.seasonality = Some(Seasonality::flat());
        let series = project(&a);

        assert!(series.months.iter().all(|m| m.seasonality_factor == 1.0));
        assert_relative_eq!(series.months[1].applied_growth_rate, 0.1);
    }

    #[test]
    fn test_zero_churn_ltv_uses_annual_revenue() {
        let mut a = test_assumptions();
        a.churn_rate = 0.0;
        let series = project(&a);
        let first = &series.months[0];

        assert_relative_eq!(first.ltv, 200.0 * 12.0);
        assert_relative_eq!(first.ltv_cac_ratio, 3.0);
    }

    #[test]
    fn test_zero_customers_records_warnings() {
        let mut a = test_assumptions();
        a.starting_customers = 0.0;
        a.starting_mrr = 0.0;
        let series = project(&a);

        assert_eq!(series.len(), 12);
        assert!(series.months.iter().all(|m| m.ltv.is_finite() && m.cac_payback_months == 0.0));
        assert!(series.warnings.iter().any(|w| w.metric == "avg_revenue_per_customer"));
    }

    #[test]
    fn test_invalid_assumptions_rejected() {
        let engine = ProjectionEngine::default();

        let mut a = test_assumptions();
        a.churn_rate = 1.5;
        assert!(matches!(engine.project(&a), Err(PlanError::InvalidAssumption { field: "churn_rate", .. })));

        let mut a = test_assumptions();
        a.price_per_customer = -10.0;
        assert!(matches!(
            engine.project(&a),
            Err(PlanError::InvalidAssumption { field: "price_per_customer", .. })
        ));
    }
}
