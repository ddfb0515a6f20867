//! Profitability maximization: better margin, higher prices, leaner overhead

use super::OptimizationStrategy;
use crate::projection::ProjectionSeries;

/// Raise margin and prices and trim overhead and slow-payback acquisition
#[derive(Debug, Clone)]
pub struct ProfitabilityStrategy {
    pub margin_improvement: f64,
    pub max_gross_margin: f64,
    /// Price multiplier for customers acquired after the repricing month
    pub new_customer_price_increase: f64,
    /// Price multiplier for the retained base after the repricing month
    pub existing_price_increase: f64,
    /// First month at the new prices (1-indexed)
    pub repricing_month: u32,
    pub overhead_factor: f64,
    pub software_cap: f64,
    /// Acquisition budgets are cut where CAC payback exceeds this many months
    pub payback_limit_months: f64,
    pub acquisition_cut: f64,
}

impl Default for ProfitabilityStrategy {
    fn default() -> Self {
        Self {
            margin_improvement: 1.1,
            max_gross_margin: 0.9,
            new_customer_price_increase: 1.2,
            existing_price_increase: 1.05,
            repricing_month: 4,
            overhead_factor: 0.8,
            software_cap: 5_000.0,
            payback_limit_months: 15.0,
            acquisition_cut: 0.7,
        }
    }
}

impl OptimizationStrategy for ProfitabilityStrategy {
    fn name(&self) -> &'static str {
        "profitability"
    }

    fn apply(&self, series: &ProjectionSeries) -> ProjectionSeries {
        let mut optimized = series.clone();
        let ctx = optimized.context;
        let price = ctx.price_per_customer;

        for i in 0..optimized.months.len() {
            let prev_mrr = if i > 0 { optimized.months[i - 1].mrr } else { 0.0 };
            let month = &mut optimized.months[i];

            month.gross_margin = (month.gross_margin * self.margin_improvement).min(self.max_gross_margin);

            if month.month >= self.repricing_month && i > 0 {
                month.churned_revenue = prev_mrr * month.churn_rate;
                month.expansion_revenue = prev_mrr * month.expansion_rate;
                month.new_customer_revenue = month.new_customers * price * self.new_customer_price_increase;
                month.mrr = (prev_mrr - month.churned_revenue) * self.existing_price_increase
                    + month.new_customer_revenue
                    + month.expansion_revenue;

                month.opex.cloud = month.customers * ctx.cloud_cost_per_customer;
                month.opex.marketing_ops = month.mrr * ctx.marketing_ops_ratio;
            }

            if i > 0 {
                if month.cac_payback_months > self.payback_limit_months {
                    month.marketing_budget *= self.acquisition_cut;
                    month.sales_budget *= self.acquisition_cut;
                }
                month.opex.other_opex *= self.overhead_factor;
                month.opex.software_subscriptions = month.opex.software_subscriptions.min(self.software_cap);
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
    fn test_margin_capped() {
        let optimized = ProfitabilityStrategy::default().apply(&base_series());
        assert!(optimized.months.iter().all(|m| (m.gross_margin - 0.88).abs() < 1e-12));

        let again = ProfitabilityStrategy::default().apply(&optimized);
        assert!(again.months.iter().all(|m| m.gross_margin == 0.9));
    }

    #[test]
    fn test_repricing_starts_in_month_four() {
        let base = base_series();
        let optimized = ProfitabilityStrategy::default().apply(&base);

        for i in 0..3 {
            assert_eq!(optimized.months[i].mrr, base.months[i].mrr);
        }

        let prev = optimized.months[2].mrr;
        let m4 = &optimized.months[3];
        let expected = (prev - prev * m4.churn_rate) * 1.05 + m4.new_customers * 200.0 * 1.2 + prev * m4.expansion_rate;
        assert_relative_eq!(m4.mrr, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_repricing_rederives_revenue_linked_costs() {
        let base = base_series();
        let optimized = ProfitabilityStrategy::default().apply(&base);
        let ctx = optimized.context;

        assert_eq!(optimized.months[2].opex.marketing_ops, base.months[2].opex.marketing_ops);
        for m in optimized.months.iter().skip(3) {
            assert_relative_eq!(m.opex.marketing_ops, m.mrr * ctx.marketing_ops_ratio, epsilon = 1e-9);
            assert_relative_eq!(m.opex.cloud, m.customers * ctx.cloud_cost_per_customer, epsilon = 1e-9);
        }
        let m4 = &optimized.months[3];
        assert!(m4.mrr != base.months[3].mrr);
        assert!(m4.opex.marketing_ops != base.months[3].opex.marketing_ops);
    }

    #[test]
    fn test_trims_overhead_after_first_month() {
        let base = base_series();
        let optimized = ProfitabilityStrategy::default().apply(&base);

        assert_eq!(optimized.months[0].opex, base.months[0].opex);
        for (before, after) in base.months.iter().zip(&optimized.months).skip(1) {
            assert_relative_eq!(after.opex.other_opex, before.opex.other_opex * 0.8, epsilon = 1e-9);
            assert!(after.opex.software_subscriptions <= 5_000.0);
        }
    }

    #[test]
    fn test_cuts_acquisition_on_slow_payback() {
        let mut base = base_series();
        base.months[5].cac_payback_months = 20.0;
        let marketing = base.months[5].marketing_budget;

        let optimized = ProfitabilityStrategy::default().apply(&base);
        assert_relative_eq!(optimized.months[5].marketing_budget, marketing * 0.7, epsilon = 1e-9);
    }

    #[test]
    fn test_profit_margin_recomputed() {
        let optimized = ProfitabilityStrategy::default().apply(&base_series());
        for m in &optimized.months {
            assert_relative_eq!(m.net_profit, m.total_revenue - m.total_costs, epsilon = 1e-9);
            assert_relative_eq!(m.profit_margin, m.net_profit / m.total_revenue, epsilon = 1e-12);
        }
    }
}
