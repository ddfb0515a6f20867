//! Simplified monthly loop for what-if scenarios
//!
//! Unlike the projection engine, new customers come straight from the marketing
//! budget (`marketing / CAC`) and existing MRR grows at a damped share of the
//! growth rate. Cash and runway follow the same cumulative rules.

use super::baseline::{OpexComponents, ScenarioBaseline};
use super::comparison::{compare, ScenarioComparison};
use super::definition::{ScenarioDefinition, ScenarioKind};
use super::impact::{recommend, ImpactAnalysis};
use crate::error::ScenarioError;
use crate::math::{mean, period_growth_rates, safe_divide};
use crate::projection::{CalculationWarning, Runway};
use serde::{Deserialize, Serialize};

/// Simulation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Share of the growth rate applied to existing MRR each month
    pub existing_growth_share: f64,
    pub max_duration_months: u32,
    /// Consecutive non-negative months that count as breakeven
    pub breakeven_window: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            existing_growth_share: 0.3,
            max_duration_months: 60,
            breakeven_window: 3,
        }
    }
}

/// One simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMonth {
    pub month: u32,
    pub customers: f64,
    pub new_customers: f64,
    pub churned_customers: f64,
    pub mrr: f64,
    pub opex: OpexComponents,
    pub total_costs: f64,
    pub net_cashflow: f64,
    pub cash_balance: f64,
    pub runway: Runway,
    pub avg_revenue_per_customer: f64,
    pub ltv: f64,
    pub ltv_cac_ratio: f64,
}

/// Aggregate results of a simulated scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub ending_mrr: f64,
    pub ending_customers: f64,
    pub ending_cash: f64,
    pub ending_runway: Runway,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,
    pub avg_monthly_growth: f64,
    /// Month-over-month MRR growth for pairs with positive prior MRR
    pub growth_rates: Vec<f64>,
    pub min_cash: f64,
    /// Cash needed to avoid ever going negative
    pub peak_cash_requirement: f64,
    pub breakeven_month: Option<u32>,
}

impl ScenarioMetrics {
    /// Aggregate a simulated series; `starting_cash` stands in for an empty one
    pub fn from_months(months: &[ScenarioMonth], starting_cash: f64, breakeven_window: usize) -> Self {
        let mrr: Vec<f64> = months.iter().map(|m| m.mrr).collect();
        let growth_rates = period_growth_rates(&mrr);
        let min_cash = months
            .iter()
            .map(|m| m.cash_balance)
            .reduce(f64::min)
            .unwrap_or(starting_cash);

        let window = breakeven_window.max(1);
        let breakeven_month = months
            .windows(window)
            .position(|w| w.iter().all(|m| m.net_cashflow >= 0.0))
            .map(|i| months[i].month);

        let last = months.last();
        Self {
            ending_mrr: last.map_or(0.0, |m| m.mrr),
            ending_customers: last.map_or(0.0, |m| m.customers),
            ending_cash: last.map_or(starting_cash, |m| m.cash_balance),
            ending_runway: last.map_or(Runway::Unlimited, |m| m.runway),
            total_revenue: mrr.iter().sum(),
            total_costs: months.iter().map(|m| m.total_costs).sum(),
            total_profit: months.iter().map(|m| m.net_cashflow).sum(),
            avg_monthly_growth: mean(&growth_rates),
            growth_rates,
            min_cash,
            peak_cash_requirement: (-min_cash).max(0.0),
            breakeven_month,
        }
    }
}

/// Everything produced for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub kind: ScenarioKind,
    pub duration_months: u32,
    pub months: Vec<ScenarioMonth>,
    pub metrics: ScenarioMetrics,
    pub comparison: ScenarioComparison,
    pub impact: ImpactAnalysis,
    pub recommendations: Vec<String>,
    pub warnings: Vec<CalculationWarning>,
}

/// Runs scenario definitions against a fixed baseline
///
/// # Example
/// ```ignore
/// let simulator = ScenarioSimulator::new(ScenarioBaseline::from_profile(&profile));
/// let outcome = simulator.run(&ScenarioDefinition::template(ScenarioKind::CostReduction))?;
/// println!("{}", outcome.metrics.ending_cash);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioSimulator {
    baseline: ScenarioBaseline,
    config: SimulationConfig,
}

impl ScenarioSimulator {
    pub fn new(baseline: ScenarioBaseline) -> Self {
        Self::with_config(baseline, SimulationConfig::default())
    }

    pub fn with_config(baseline: ScenarioBaseline, config: SimulationConfig) -> Self {
        Self { baseline, config }
    }

    pub fn baseline(&self) -> &ScenarioBaseline {
        &self.baseline
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate one scenario and compare it with the baseline
    pub fn run(&self, definition: &ScenarioDefinition) -> Result<ScenarioOutcome, ScenarioError> {
        let months = definition.duration_months;
        if months == 0 || months > self.config.max_duration_months {
            return Err(ScenarioError::InvalidDuration {
                months,
                max: self.config.max_duration_months,
            });
        }
        self.baseline.validate()?;

        let adjusted = self.baseline.with_deltas(&definition.deltas)?;
        let mut warnings = Vec::new();
        let series = self.simulate(&adjusted, months, &mut warnings);
        let metrics = ScenarioMetrics::from_months(&series, adjusted.cash, self.config.breakeven_window);

        let comparison = compare(&self.baseline, &metrics);
        let impact = ImpactAnalysis::assess(definition, &self.baseline, &metrics, &comparison);
        let recommendations = recommend(definition.kind, &impact, &metrics);

        log::info!(
            "Scenario '{}' over {} months: ending MRR {:.0}, ending cash {:.0}",
            definition.name,
            months,
            metrics.ending_mrr,
            metrics.ending_cash
        );

        Ok(ScenarioOutcome {
            name: definition.name.clone(),
            kind: definition.kind,
            duration_months: months,
            months: series,
            metrics,
            comparison,
            impact,
            recommendations,
            warnings,
        })
    }

    /// Monthly loop over an already-adjusted baseline
    pub fn simulate(
        &self,
        adjusted: &ScenarioBaseline,
        duration_months: u32,
        warnings: &mut Vec<CalculationWarning>,
    ) -> Vec<ScenarioMonth> {
        let opex = adjusted.resolved_opex();
        let total_costs = opex.total();
        let price = adjusted.average_price;

        let mut months = Vec::with_capacity(duration_months as usize);
        let mut prev_mrr = adjusted.mrr;
        let mut prev_customers = adjusted.customers;
        let mut cash = adjusted.cash;

        for month in 1..=duration_months {
            let (customers, new_customers, churned_customers, mrr) = if month == 1 {
                (adjusted.customers, 0.0, 0.0, adjusted.mrr)
            } else {
                let new = if adjusted.cac > 0.0 {
                    (opex.marketing / adjusted.cac).floor()
                } else {
                    0.0
                };
                let churned = (prev_customers * adjusted.churn_rate).floor();
                let customers = prev_customers - churned + new;
                let mrr = prev_mrr
                    + prev_mrr * adjusted.monthly_growth_rate * self.config.existing_growth_share
                    + new * price
                    - churned * price;
                (customers, new, churned, mrr.max(0.0))
            };

            let net_cashflow = mrr - total_costs;
            let cash_before = cash;
            cash += net_cashflow;

            let avg_revenue_per_customer = safe_divide(mrr, customers);
            let ltv = safe_divide(avg_revenue_per_customer, adjusted.churn_rate);
            let ltv_cac_ratio = safe_divide(ltv, adjusted.cac);

            if customers <= 0.0 {
                warnings.push(CalculationWarning::new(month, "avg_revenue_per_customer", "no customers"));
            }
            if adjusted.churn_rate <= 0.0 {
                warnings.push(CalculationWarning::new(month, "ltv", "churn rate is zero"));
            }
            if adjusted.cac <= 0.0 {
                warnings.push(CalculationWarning::new(month, "ltv_cac_ratio", "CAC is zero"));
            }

            log::debug!("Scenario month {}: MRR {:.0}, customers {:.0}, cash {:.0}", month, mrr, customers, cash);

            months.push(ScenarioMonth {
                month,
                customers,
                new_customers,
                churned_customers,
                mrr,
                opex,
                total_costs,
                net_cashflow,
                cash_balance: cash,
                runway: Runway::from_cashflow(cash_before, net_cashflow),
                avg_revenue_per_customer,
                ltv,
                ltv_cac_ratio,
            });

            prev_mrr = mrr;
            prev_customers = customers;
        }

        months
    }
}
