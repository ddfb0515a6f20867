//! Baseline company state that scenarios are measured against

use super::definition::{ParameterDelta, ScenarioParameter};
use crate::assumptions::PlanAssumptions;
use crate::company::CompanyProfile;
use crate::error::ScenarioError;
use crate::projection::Runway;
use serde::{Deserialize, Serialize};

/// Default monthly burn when a profile does not report one
pub const DEFAULT_MONTHLY_BURN: f64 = 10_000.0;
/// Default runway in months when a profile does not report one
pub const DEFAULT_RUNWAY_MONTHS: f64 = 12.0;

/// Monthly operating costs driving a scenario simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpexComponents {
    pub salaries: f64,
    pub marketing: f64,
    pub cloud: f64,
    pub other: f64,
}

impl OpexComponents {
    /// Split a monthly burn 60/20/10/10 into salaries, marketing, cloud and other
    pub fn from_burn(burn: f64) -> Self {
        Self {
            salaries: burn * 0.6,
            marketing: burn * 0.2,
            cloud: burn * 0.1,
            other: burn * 0.1,
        }
    }

    pub fn total(&self) -> f64 {
        self.salaries + self.marketing + self.cloud + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBaseline {
    pub mrr: f64,
    pub customers: f64,
    pub cash: f64,
    pub monthly_burn: f64,
    pub runway: Runway,
    pub monthly_growth_rate: f64,
    pub churn_rate: f64,
    pub cac: f64,
    pub average_price: f64,
    /// Explicit OPEX; derived from the burn when absent
    #[serde(default)]
    pub opex: Option<OpexComponents>,
}

impl ScenarioBaseline {
    /// Baseline from a company's current position with default growth drivers
    pub fn from_profile(profile: &CompanyProfile) -> Self {
        let average_price = if profile.price_per_customer > 0.0 {
            profile.price_per_customer
        } else {
            100.0
        };

        Self {
            mrr: profile.mrr,
            customers: profile.customers,
            cash: profile.cash_balance,
            monthly_burn: profile.monthly_burn.unwrap_or(DEFAULT_MONTHLY_BURN),
            runway: Runway::Months(profile.runway_months.unwrap_or(DEFAULT_RUNWAY_MONTHS)),
            monthly_growth_rate: 0.1,
            churn_rate: 0.05,
            cac: 1_000.0,
            average_price,
            opex: None,
        }
    }

    /// Baseline from plan assumptions with OPEX taken from the month-one cost drivers
    pub fn from_assumptions(assumptions: &PlanAssumptions) -> Self {
        let team = f64::from(assumptions.team_size);
        let salaries = team * assumptions.salary_per_employee;
        let opex = OpexComponents {
            salaries,
            marketing: assumptions.starting_customers * assumptions.customer_growth_rate * assumptions.cac_target,
            cloud: assumptions.starting_customers * assumptions.cloud_cost_per_customer,
            other: team * assumptions.office_rent_per_person + salaries * 0.15,
        };
        let burn = (opex.total() - assumptions.starting_mrr).max(0.0);

        Self {
            mrr: assumptions.starting_mrr,
            customers: assumptions.starting_customers,
            cash: assumptions.starting_cash,
            monthly_burn: burn,
            runway: Runway::from_cashflow(assumptions.starting_cash, -burn),
            monthly_growth_rate: assumptions.mrr_growth_rate,
            churn_rate: assumptions.churn_rate,
            cac: assumptions.cac_target,
            average_price: assumptions.price_per_customer,
            opex: Some(opex),
        }
    }

    /// OPEX components, auto-derived from burn when none were given
    pub fn resolved_opex(&self) -> OpexComponents {
        self.opex.unwrap_or_else(|| OpexComponents::from_burn(self.monthly_burn))
    }

    pub fn with_opex(mut self, opex: OpexComponents) -> Self {
        self.opex = Some(opex);
        self
    }

    /// Current value of a scenario parameter
    pub fn value(&self, parameter: ScenarioParameter) -> f64 {
        let opex = self.resolved_opex();
        match parameter {
            ScenarioParameter::MonthlyGrowthRate => self.monthly_growth_rate,
            ScenarioParameter::ChurnRate => self.churn_rate,
            ScenarioParameter::Cac => self.cac,
            ScenarioParameter::AveragePrice => self.average_price,
            ScenarioParameter::CashBalance => self.cash,
            ScenarioParameter::Salaries => opex.salaries,
            ScenarioParameter::MarketingBudget => opex.marketing,
            ScenarioParameter::CloudCosts => opex.cloud,
            ScenarioParameter::OtherOpex => opex.other,
        }
    }

    /// Copy of the baseline with every delta applied
    ///
    /// Fails when a changed parameter leaves its valid range: churn outside
    /// [0, 1], growth below -1, or a negative price, CAC or cost.
    pub fn with_deltas(&self, deltas: &[ParameterDelta]) -> Result<Self, ScenarioError> {
        let mut adjusted = self.clone();
        let mut opex = self.resolved_opex();

        for delta in deltas {
            let value = delta.apply(self.value(delta.parameter));
            validate_parameter(delta.parameter, value)?;

            match delta.parameter {
                ScenarioParameter::MonthlyGrowthRate => adjusted.monthly_growth_rate = value,
                ScenarioParameter::ChurnRate => adjusted.churn_rate = value,
                ScenarioParameter::Cac => adjusted.cac = value,
                ScenarioParameter::AveragePrice => adjusted.average_price = value,
                ScenarioParameter::CashBalance => adjusted.cash = value,
                ScenarioParameter::Salaries => opex.salaries = value,
                ScenarioParameter::MarketingBudget => opex.marketing = value,
                ScenarioParameter::CloudCosts => opex.cloud = value,
                ScenarioParameter::OtherOpex => opex.other = value,
            }
        }

        adjusted.opex = Some(opex);
        Ok(adjusted)
    }

    /// Reject a baseline that cannot be simulated
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let numbers = [
            ("mrr", self.mrr),
            ("customers", self.customers),
            ("cash", self.cash),
            ("monthly_burn", self.monthly_burn),
            ("monthly_growth_rate", self.monthly_growth_rate),
            ("churn_rate", self.churn_rate),
            ("cac", self.cac),
            ("average_price", self.average_price),
        ];
        if let Some((name, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScenarioError::InvalidBaseline(format!("{} is not finite ({})", name, value)));
        }
        if self.mrr < 0.0 || self.customers < 0.0 {
            return Err(ScenarioError::InvalidBaseline("MRR and customers must not be negative".to_string()));
        }
        Ok(())
    }
}

fn validate_parameter(parameter: ScenarioParameter, value: f64) -> Result<(), ScenarioError> {
    let valid = value.is_finite()
        && match parameter {
            ScenarioParameter::ChurnRate => (0.0..=1.0).contains(&value),
            ScenarioParameter::MonthlyGrowthRate => value >= -1.0,
            ScenarioParameter::CashBalance => true,
            _ => value >= 0.0,
        };

    if valid {
        Ok(())
    } else {
        Err(ScenarioError::InvalidParameter {
            parameter: parameter.to_string(),
            value,
        })
    }
}
