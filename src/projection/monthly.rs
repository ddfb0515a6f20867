//! Per-month plan records

use crate::assumptions::CapexBreakdown;
use crate::math::safe_divide;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Runway value persisted for months without burn
pub const INFINITE_RUNWAY_SENTINEL: f64 = 999.0;

/// Months of cash remaining at the current burn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Runway {
    /// Cash lasts this many months at the current net burn
    Months(f64),
    /// Net cashflow is non-negative: no burn
    Unlimited,
}

impl Runway {
    /// Runway for a month given the cash available before it and its net cashflow
    pub fn from_cashflow(cash_before: f64, net_cashflow: f64) -> Self {
        if net_cashflow < 0.0 {
            Runway::Months(safe_divide(cash_before.max(0.0), net_cashflow.abs()))
        } else {
            Runway::Unlimited
        }
    }

    /// Finite runway in months, `None` when there is no burn
    pub fn finite(&self) -> Option<f64> {
        match self {
            Runway::Months(months) => Some(*months),
            Runway::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Runway::Unlimited)
    }

    /// Runway in months with `Unlimited` mapped to the persisted sentinel (999)
    pub fn months_or_sentinel(&self) -> f64 {
        self.finite().unwrap_or(INFINITE_RUNWAY_SENTINEL)
    }

    /// Runway in months, capped; `Unlimited` counts as the cap
    pub fn capped(&self, cap: f64) -> f64 {
        self.finite().map_or(cap, |months| months.min(cap))
    }
}

impl Serialize for Runway {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.months_or_sentinel())
    }
}

impl<'de> Deserialize<'de> for Runway {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let months = f64::deserialize(deserializer)?;
        if !months.is_finite() || months >= INFINITE_RUNWAY_SENTINEL {
            Ok(Runway::Unlimited)
        } else {
            Ok(Runway::Months(months))
        }
    }
}

/// Operating expenses for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpexBreakdown {
    pub salaries: f64,
    pub office_rent: f64,
    pub cloud: f64,
    pub software_subscriptions: f64,
    pub legal_accounting: f64,
    pub marketing_ops: f64,
    pub other_opex: f64,
}

impl OpexBreakdown {
    /// Split the general overhead pool into software 30%, legal/accounting 20%, other 50%
    pub fn with_overhead_pool(mut self, pool: f64) -> Self {
        self.software_subscriptions = pool * 0.3;
        self.legal_accounting = pool * 0.2;
        self.other_opex = pool * 0.5;
        self
    }

    pub fn total(&self) -> f64 {
        self.salaries
            + self.office_rent
            + self.cloud
            + self.software_subscriptions
            + self.legal_accounting
            + self.marketing_ops
            + self.other_opex
    }

    /// Every category multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            salaries: self.salaries * factor,
            office_rent: self.office_rent * factor,
            cloud: self.cloud * factor,
            software_subscriptions: self.software_subscriptions * factor,
            legal_accounting: self.legal_accounting * factor,
            marketing_ops: self.marketing_ops * factor,
            other_opex: self.other_opex * factor,
        }
    }
}

/// A metric that fell back to a default because of a zero denominator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationWarning {
    pub month: u32,
    pub metric: String,
    pub reason: String,
}

impl CalculationWarning {
    pub(crate) fn new(month: u32, metric: &str, reason: &str) -> Self {
        Self {
            month,
            metric: metric.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// State of the plan for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyState {
    /// Plan month (1-indexed)
    pub month: u32,

    // Drivers in effect for this month
    pub seasonality_factor: f64,
    /// Organic MRR growth applied on top of last month (growth rate x seasonality, 0 in month 1)
    pub applied_growth_rate: f64,
    pub churn_rate: f64,
    pub expansion_rate: f64,
    pub headcount: u32,

    // Customers
    pub customers: f64,
    pub new_customers: f64,
    pub churned_customers: f64,

    // Revenue
    pub mrr: f64,
    pub new_customer_revenue: f64,
    pub expansion_revenue: f64,
    pub churned_revenue: f64,

    // Acquisition
    pub cac: f64,
    pub marketing_budget: f64,
    pub sales_budget: f64,

    // Costs
    pub opex: OpexBreakdown,
    pub capex: CapexBreakdown,

    // Totals and cash
    pub total_revenue: f64,
    pub total_opex: f64,
    pub total_capex: f64,
    pub total_costs: f64,
    pub net_cashflow: f64,
    pub cash_balance: f64,

    // Unit economics
    pub avg_revenue_per_customer: f64,
    pub ltv: f64,
    pub ltv_cac_ratio: f64,
    pub cac_payback_months: f64,
    pub gross_margin: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub burn_rate: f64,
    pub runway: Runway,
}

impl MonthlyState {
    /// Create an empty month
    pub fn new(month: u32) -> Self {
        Self {
            month,
            seasonality_factor: 1.0,
            applied_growth_rate: 0.0,
            churn_rate: 0.0,
            expansion_rate: 0.0,
            headcount: 0,
            customers: 0.0,
            new_customers: 0.0,
            churned_customers: 0.0,
            mrr: 0.0,
            new_customer_revenue: 0.0,
            expansion_revenue: 0.0,
            churned_revenue: 0.0,
            cac: 0.0,
            marketing_budget: 0.0,
            sales_budget: 0.0,
            opex: OpexBreakdown::default(),
            capex: CapexBreakdown::default(),
            total_revenue: 0.0,
            total_opex: 0.0,
            total_capex: 0.0,
            total_costs: 0.0,
            net_cashflow: 0.0,
            cash_balance: 0.0,
            avg_revenue_per_customer: 0.0,
            ltv: 0.0,
            ltv_cac_ratio: 0.0,
            cac_payback_months: 0.0,
            gross_margin: 0.0,
            gross_profit: 0.0,
            net_profit: 0.0,
            profit_margin: 0.0,
            burn_rate: 0.0,
            runway: Runway::Unlimited,
        }
    }

    /// Recompute totals, cash and unit economics from this month's drivers
    ///
    /// `cash_before` is the closing cash of the previous month (starting cash for month 1).
    /// Zero-denominator fallbacks are appended to `warnings`.
    pub fn refresh(&mut self, cash_before: f64, warnings: &mut Vec<CalculationWarning>) {
        self.total_revenue = self.mrr;
        self.total_opex = self.opex.total();
        self.total_capex = self.capex.total();
        self.total_costs = self.total_opex + self.total_capex;

        self.net_cashflow = self.total_revenue - self.total_costs;
        self.cash_balance = cash_before + self.net_cashflow;
        self.burn_rate = (self.total_costs - self.total_revenue).max(0.0);
        self.runway = Runway::from_cashflow(cash_before, self.net_cashflow);

        if self.customers <= 0.0 {
            warnings.push(CalculationWarning::new(self.month, "avg_revenue_per_customer", "no customers"));
        }
        self.avg_revenue_per_customer = safe_divide(self.mrr, self.customers);

        self.ltv = if self.churn_rate > 0.0 {
            self.avg_revenue_per_customer / self.churn_rate
        } else {
            self.avg_revenue_per_customer * 12.0
        };

        if self.cac == 0.0 {
            warnings.push(CalculationWarning::new(self.month, "ltv_cac_ratio", "CAC is zero"));
        }
        self.ltv_cac_ratio = safe_divide(self.ltv, self.cac);

        if self.avg_revenue_per_customer == 0.0 {
            warnings.push(CalculationWarning::new(self.month, "cac_payback_months", "no revenue per customer"));
        }
        self.cac_payback_months = safe_divide(self.cac, self.avg_revenue_per_customer);

        self.gross_profit = self.total_revenue * self.gross_margin;
        self.net_profit = self.net_cashflow;
        self.profit_margin = safe_divide(self.net_profit, self.total_revenue);
    }
}
