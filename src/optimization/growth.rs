//! Growth maximization: buy more customers and expansion revenue

use super::OptimizationStrategy;
use crate::math::safe_divide;
use crate::projection::ProjectionSeries;

/// Scale acquisition from month 2 on and rebuild revenue on the boosted base
#[derive(Debug, Clone)]
pub struct GrowthStrategy {
    /// Multiplier on marketing and sales budgets, new customers and expansion
    pub growth_multiplier: f64,
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self { growth_multiplier: 1.3 }
    }
}

impl OptimizationStrategy for GrowthStrategy {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn apply(&self, series: &ProjectionSeries) -> ProjectionSeries {
        let mut optimized = series.clone();
        let ctx = optimized.context;
        let boost = self.growth_multiplier;

        for i in 1..optimized.months.len() {
            let (prev_mrr, prev_customers) = {
                let prev = &optimized.months[i - 1];
                (prev.mrr, prev.customers)
            };
            let month = &mut optimized.months[i];

            month.marketing_budget *= boost;
            month.sales_budget *= boost;
            month.new_customers *= boost;
            month.expansion_rate *= boost;

            // Rebuild on the already-optimized prior month
            month.churned_customers = prev_customers * month.churn_rate;
            month.customers = prev_customers - month.churned_customers + month.new_customers;

            month.expansion_revenue = prev_mrr * month.expansion_rate;
            month.churned_revenue = prev_mrr * month.churn_rate;
            month.new_customer_revenue = (month.customers - prev_customers) * ctx.price_per_customer;
            month.mrr = prev_mrr * (1.0 + month.applied_growth_rate) + month.expansion_revenue
                - month.churned_revenue
                + month.new_customer_revenue;

            month.opex.cloud = month.customers * ctx.cloud_cost_per_customer;
            month.opex.marketing_ops = month.mrr * ctx.marketing_ops_ratio;

            if month.new_customers > 0.0 {
                month.cac = safe_divide(month.marketing_budget + month.sales_budget, month.new_customers);
            }
        }

        optimized.recalculate();
        optimized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::test_support::base_series;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_month_untouched() {
        let base = base_series();
        let optimized = GrowthStrategy::default().apply(&base);

        assert_eq!(optimized.months[0].mrr, base.months[0].mrr);
        assert_eq!(optimized.months[0].customers, base.months[0].customers);
        assert_eq!(optimized.months[0].cac, base.months[0].cac);
    }

    #[test]
    fn test_boosts_acquisition_and_revenue() {
        let base = base_series();
        let optimized = GrowthStrategy::default().apply(&base);

        for (before, after) in base.months.iter().zip(&optimized.months).skip(1) {
            assert_relative_eq!(after.new_customers, before.new_customers * 1.3, epsilon = 1e-9);
            assert_relative_eq!(after.marketing_budget, before.marketing_budget * 1.3, epsilon = 1e-6);
            assert_relative_eq!(after.expansion_rate, before.expansion_rate * 1.3, epsilon = 1e-12);
            assert!(after.customers > before.customers);
            assert!(after.mrr > before.mrr);
        }
    }

    #[test]
    fn test_rederives_dependent_costs() {
        let optimized = GrowthStrategy::default().apply(&base_series());
        let m3 = &optimized.months[2];

        assert_relative_eq!(m3.opex.cloud, m3.customers * optimized.context.cloud_cost_per_customer, epsilon = 1e-9);
        assert_relative_eq!(m3.opex.marketing_ops, m3.mrr * 0.05, epsilon = 1e-9);
        assert_relative_eq!(m3.cac, (m3.marketing_budget + m3.sales_budget) / m3.new_customers, epsilon = 1e-9);
    }

    #[test]
    fn test_keeps_cac_without_new_customers() {
        let mut base = base_series();
        base.months[4].new_customers = 0.0;
        base.months[4].marketing_budget = 0.0;
        base.months[4].sales_budget = 0.0;
        let cac_before = base.months[4].cac;

        let optimized = GrowthStrategy::default().apply(&base);
        assert_eq!(optimized.months[4].cac, cac_before);
    }
}
