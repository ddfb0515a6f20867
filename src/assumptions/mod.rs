//! Planning assumptions: growth, churn, pricing, cost drivers and seasonality

mod capex;
mod seasonality;
pub mod loader;

pub use capex::{CapexBreakdown, CapexItem};
pub use loader::{load_assumptions, load_capex_items, DEFAULT_ASSUMPTIONS_PATH};
pub use seasonality::{Seasonality, DEFAULT_SEASONALITY};

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// Months in a plan
pub const PLAN_MONTHS: u32 = 12;

/// Immutable input to a 12-month projection
///
/// Monetary amounts are monthly. Rates are monthly fractions (0.05 = 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAssumptions {
    #[serde(default = "default_plan_name")]
    pub plan_name: String,

    #[serde(default)]
    pub plan_year: Option<i32>,

    // Current state
    pub starting_mrr: f64,
    pub starting_customers: f64,
    pub price_per_customer: f64,
    pub team_size: u32,
    pub starting_cash: f64,

    // Growth drivers
    #[serde(default = "default_mrr_growth_rate")]
    pub mrr_growth_rate: f64,
    #[serde(default = "default_customer_growth_rate")]
    pub customer_growth_rate: f64,
    #[serde(default = "default_churn_rate")]
    pub churn_rate: f64,
    #[serde(default = "default_expansion_rate")]
    pub expansion_rate: f64,

    // Acquisition
    #[serde(default = "default_cac_target")]
    pub cac_target: f64,
    #[serde(default = "default_cac_payback_target")]
    pub cac_payback_target: f64,

    // Cost drivers
    #[serde(default = "default_salary_per_employee")]
    pub salary_per_employee: f64,
    #[serde(default = "default_office_rent_per_person")]
    pub office_rent_per_person: f64,
    #[serde(default = "default_cloud_cost_per_customer")]
    pub cloud_cost_per_customer: f64,

    // Capital expenditure
    #[serde(default)]
    pub capex_budget: Option<f64>,
    #[serde(default)]
    pub capex_items: Vec<CapexItem>,

    /// Custom seasonality; the built-in curve is used when absent
    #[serde(default)]
    pub seasonality: Option<Seasonality>,
}

fn default_plan_name() -> String {
    "12-month plan".to_string()
}

fn default_mrr_growth_rate() -> f64 {
    0.2
}

fn default_customer_growth_rate() -> f64 {
    0.15
}

fn default_churn_rate() -> f64 {
    0.05
}

fn default_expansion_rate() -> f64 {
    0.1
}

fn default_cac_target() -> f64 {
    20_000.0
}

fn default_cac_payback_target() -> f64 {
    12.0
}

fn default_salary_per_employee() -> f64 {
    150_000.0
}

fn default_office_rent_per_person() -> f64 {
    10_000.0
}

fn default_cloud_cost_per_customer() -> f64 {
    50.0
}

impl PlanAssumptions {
    /// Assumptions for a company's current state with default growth and cost drivers
    pub fn new(
        starting_mrr: f64,
        starting_customers: f64,
        price_per_customer: f64,
        team_size: u32,
        starting_cash: f64,
    ) -> Self {
        Self {
            plan_name: default_plan_name(),
            plan_year: None,
            starting_mrr,
            starting_customers,
            price_per_customer,
            team_size,
            starting_cash,
            mrr_growth_rate: default_mrr_growth_rate(),
            customer_growth_rate: default_customer_growth_rate(),
            churn_rate: default_churn_rate(),
            expansion_rate: default_expansion_rate(),
            cac_target: default_cac_target(),
            cac_payback_target: default_cac_payback_target(),
            salary_per_employee: default_salary_per_employee(),
            office_rent_per_person: default_office_rent_per_person(),
            cloud_cost_per_customer: default_cloud_cost_per_customer(),
            capex_budget: None,
            capex_items: Vec::new(),
            seasonality: None,
        }
    }

    /// Seasonality factor for a plan month, falling back to the default curve
    pub fn seasonality_factor(&self, month: u32) -> f64 {
        self.seasonality.unwrap_or_default().factor(month)
    }

    /// Total cost of one-off CAPEX items scheduled for `month`
    pub fn scheduled_capex(&self, month: u32) -> f64 {
        self.capex_items
            .iter()
            .filter(|item| item.purchase_month == month)
            .map(|item| item.cost)
            .sum()
    }

    /// Reject malformed assumptions before any month is computed
    pub fn validate(&self) -> Result<(), PlanError> {
        let numbers = [
            ("starting_mrr", self.starting_mrr),
            ("starting_customers", self.starting_customers),
            ("price_per_customer", self.price_per_customer),
            ("starting_cash", self.starting_cash),
            ("mrr_growth_rate", self.mrr_growth_rate),
            ("customer_growth_rate", self.customer_growth_rate),
            ("churn_rate", self.churn_rate),
            ("expansion_rate", self.expansion_rate),
            ("cac_target", self.cac_target),
            ("cac_payback_target", self.cac_payback_target),
            ("salary_per_employee", self.salary_per_employee),
            ("office_rent_per_person", self.office_rent_per_person),
            ("cloud_cost_per_customer", self.cloud_cost_per_customer),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(PlanError::invalid(field, format!("must be a finite number, got {}", value)));
            }
        }

        if self.starting_mrr < 0.0 {
            return Err(PlanError::invalid("starting_mrr", "MRR cannot be negative"));
        }
        if self.starting_customers < 0.0 {
            return Err(PlanError::invalid("starting_customers", "customer count cannot be negative"));
        }
        if self.price_per_customer <= 0.0 {
            return Err(PlanError::invalid("price_per_customer", "price must be positive"));
        }
        if self.team_size == 0 {
            return Err(PlanError::invalid("team_size", "team size must be positive"));
        }
        if self.starting_cash < 0.0 {
            return Err(PlanError::invalid("starting_cash", "cash balance cannot be negative"));
        }
        if !(-1.0..=5.0).contains(&self.mrr_growth_rate) {
            return Err(PlanError::invalid("mrr_growth_rate", "growth rate must be between -100% and 500%"));
        }
        if !(0.0..=1.0).contains(&self.churn_rate) {
            return Err(PlanError::invalid("churn_rate", "churn rate must be between 0 and 1"));
        }
        if self.customer_growth_rate < -1.0 {
            return Err(PlanError::invalid("customer_growth_rate", "customer growth cannot be below -100%"));
        }
        if self.expansion_rate < 0.0 {
            return Err(PlanError::invalid("expansion_rate", "expansion rate cannot be negative"));
        }

        let costs = [
            ("cac_target", self.cac_target),
            ("salary_per_employee", self.salary_per_employee),
            ("office_rent_per_person", self.office_rent_per_person),
            ("cloud_cost_per_customer", self.cloud_cost_per_customer),
        ];
        for (field, value) in costs {
            if value < 0.0 {
                return Err(PlanError::invalid(field, "cost cannot be negative"));
            }
        }

        if let Some(budget) = self.capex_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(PlanError::invalid("capex_budget", "CAPEX budget must be a non-negative number"));
            }
        }
        for item in &self.capex_items {
            if !(1..=PLAN_MONTHS).contains(&item.purchase_month) {
                return Err(PlanError::invalid(
                    "capex_items",
                    format!("purchase month {} is outside 1..=12", item.purchase_month),
                ));
            }
            if !item.cost.is_finite() || item.cost < 0.0 {
                return Err(PlanError::invalid("capex_items", format!("invalid cost {} for `{}`", item.cost, item.name)));
            }
        }

        if let Some(curve) = &self.seasonality {
            if curve.factors().iter().any(|f| !f.is_finite() || *f <= 0.0) {
                return Err(PlanError::invalid("seasonality", "every factor must be a positive number"));
            }
        }

        Ok(())
    }
}
