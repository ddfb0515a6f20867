//! Scenario definitions and built-in templates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default scenario length in months
pub const DEFAULT_DURATION_MONTHS: u32 = 12;

/// Baseline value a scenario can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioParameter {
    MonthlyGrowthRate,
    ChurnRate,
    Cac,
    AveragePrice,
    CashBalance,
    Salaries,
    MarketingBudget,
    CloudCosts,
    OtherOpex,
}

impl ScenarioParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioParameter::MonthlyGrowthRate => "monthly_growth_rate",
            ScenarioParameter::ChurnRate => "churn_rate",
            ScenarioParameter::Cac => "cac",
            ScenarioParameter::AveragePrice => "average_price",
            ScenarioParameter::CashBalance => "cash_balance",
            ScenarioParameter::Salaries => "salaries",
            ScenarioParameter::MarketingBudget => "marketing_budget",
            ScenarioParameter::CloudCosts => "cloud_costs",
            ScenarioParameter::OtherOpex => "other_opex",
        }
    }

    /// Growth drivers; large increases count as aggressive
    pub fn is_growth_driver(&self) -> bool {
        matches!(self, ScenarioParameter::MonthlyGrowthRate)
    }

    /// Cost lines; large cuts count as aggressive
    pub fn is_cost(&self) -> bool {
        matches!(
            self,
            ScenarioParameter::Salaries
                | ScenarioParameter::MarketingBudget
                | ScenarioParameter::CloudCosts
                | ScenarioParameter::OtherOpex
        )
    }
}

impl fmt::Display for ScenarioParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly_growth_rate" | "growth" | "mrr_growth_rate" => Ok(ScenarioParameter::MonthlyGrowthRate),
            "churn_rate" | "churn" => Ok(ScenarioParameter::ChurnRate),
            "cac" => Ok(ScenarioParameter::Cac),
            "average_price" | "price" => Ok(ScenarioParameter::AveragePrice),
            "cash_balance" | "cash" => Ok(ScenarioParameter::CashBalance),
            "salaries" => Ok(ScenarioParameter::Salaries),
            "marketing_budget" | "marketing" => Ok(ScenarioParameter::MarketingBudget),
            "cloud_costs" | "cloud" => Ok(ScenarioParameter::CloudCosts),
            "other_opex" => Ok(ScenarioParameter::OtherOpex),
            other => Err(format!("unknown scenario parameter `{}`", other)),
        }
    }
}

/// How a delta changes its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// `value * (1 + change)`
    Relative,
    /// `value + change`
    Absolute,
}

/// Weight of a parameter change in the scenario's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactWeight {
    Low,
    Medium,
    High,
}

/// One parameter change in a scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDelta {
    pub parameter: ScenarioParameter,
    pub change: f64,
    pub kind: ChangeKind,
    pub impact: ImpactWeight,
}

impl ParameterDelta {
    pub fn relative(parameter: ScenarioParameter, change: f64, impact: ImpactWeight) -> Self {
        Self { parameter, change, kind: ChangeKind::Relative, impact }
    }

    pub fn absolute(parameter: ScenarioParameter, change: f64, impact: ImpactWeight) -> Self {
        Self { parameter, change, kind: ChangeKind::Absolute, impact }
    }

    /// New value of the parameter
    pub fn apply(&self, value: f64) -> f64 {
        match self.kind {
            ChangeKind::Relative => value * (1.0 + self.change),
            ChangeKind::Absolute => value + self.change,
        }
    }

    /// Relative size of the change against `base`
    pub fn relative_change(&self, base: f64) -> f64 {
        match self.kind {
            ChangeKind::Relative => self.change,
            ChangeKind::Absolute if base != 0.0 => self.change / base,
            ChangeKind::Absolute => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    GrowthAcceleration,
    CostReduction,
    Fundraising,
    MarketDownturn,
    PricingIncrease,
    Custom,
}

impl ScenarioKind {
    /// Kinds with a built-in template
    pub const TEMPLATES: [ScenarioKind; 5] = [
        ScenarioKind::GrowthAcceleration,
        ScenarioKind::CostReduction,
        ScenarioKind::Fundraising,
        ScenarioKind::MarketDownturn,
        ScenarioKind::PricingIncrease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::GrowthAcceleration => "growth_acceleration",
            ScenarioKind::CostReduction => "cost_reduction",
            ScenarioKind::Fundraising => "fundraising",
            ScenarioKind::MarketDownturn => "market_downturn",
            ScenarioKind::PricingIncrease => "pricing_increase",
            ScenarioKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "growth_acceleration" | "growth" => Ok(ScenarioKind::GrowthAcceleration),
            "cost_reduction" | "cost" => Ok(ScenarioKind::CostReduction),
            "fundraising" => Ok(ScenarioKind::Fundraising),
            "market_downturn" | "downturn" => Ok(ScenarioKind::MarketDownturn),
            "pricing_increase" | "pricing" => Ok(ScenarioKind::PricingIncrease),
            "custom" => Ok(ScenarioKind::Custom),
            other => Err(format!("unknown scenario kind `{}`", other)),
        }
    }
}

/// A named set of parameter changes simulated over a fixed horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub kind: ScenarioKind,
    #[serde(default)]
    pub description: String,
    pub deltas: Vec<ParameterDelta>,
    pub duration_months: u32,
    /// Estimated likelihood of the scenario playing out
    #[serde(default)]
    pub probability: Option<f64>,
}

impl ScenarioDefinition {
    /// Built-in template; `Custom` yields an empty definition
    pub fn template(kind: ScenarioKind) -> Self {
        use ImpactWeight::{High, Low, Medium};
        use ScenarioParameter::*;

        let (name, description, deltas, duration_months, probability) = match kind {
            ScenarioKind::GrowthAcceleration => (
                "Growth acceleration",
                "Faster revenue growth backed by a larger marketing budget",
                vec![
                    ParameterDelta::relative(MonthlyGrowthRate, 0.3, High),
                    ParameterDelta::relative(MarketingBudget, 0.2, Medium),
                ],
                12,
                Some(0.4),
            ),
            ScenarioKind::CostReduction => (
                "Cost reduction",
                "Leaner operations across payroll, marketing and infrastructure",
                vec![
                    ParameterDelta::relative(Salaries, -0.15, High),
                    ParameterDelta::relative(MarketingBudget, -0.1, Medium),
                    ParameterDelta::relative(CloudCosts, -0.2, Low),
                    ParameterDelta::relative(OtherOpex, -0.25, Medium),
                ],
                6,
                Some(0.6),
            ),
            ScenarioKind::Fundraising => (
                "Fundraising round",
                "A closed round funds hiring and marketing",
                vec![
                    ParameterDelta::relative(CashBalance, 2.0, High),
                    ParameterDelta::relative(Salaries, 0.3, Medium),
                    ParameterDelta::relative(MarketingBudget, 0.4, High),
                ],
                18,
                Some(0.3),
            ),
            ScenarioKind::MarketDownturn => (
                "Market downturn",
                "Slower growth, higher churn and pricier acquisition",
                vec![
                    ParameterDelta::relative(MonthlyGrowthRate, -0.4, High),
                    ParameterDelta::relative(ChurnRate, 0.2, Medium),
                    ParameterDelta::relative(Cac, 0.15, Medium),
                ],
                12,
                Some(0.2),
            ),
            ScenarioKind::PricingIncrease => (
                "Pricing increase",
                "Higher prices at the cost of slightly higher churn",
                vec![
                    ParameterDelta::relative(AveragePrice, 0.2, High),
                    ParameterDelta::relative(ChurnRate, 0.05, Medium),
                ],
                6,
                Some(0.5),
            ),
            ScenarioKind::Custom => ("Custom scenario", "", Vec::new(), DEFAULT_DURATION_MONTHS, None),
        };

        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            deltas,
            duration_months,
            probability,
        }
    }

    /// Every built-in template
    pub fn templates() -> Vec<Self> {
        ScenarioKind::TEMPLATES.iter().map(|kind| Self::template(*kind)).collect()
    }

    pub fn custom(name: impl Into<String>, deltas: Vec<ParameterDelta>, duration_months: u32) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Custom,
            description: String::new(),
            deltas,
            duration_months,
            probability: None,
        }
    }

    /// Override the horizon
    pub fn with_duration(mut self, duration_months: u32) -> Self {
        self.duration_months = duration_months;
        self
    }

    /// Add or replace the delta for a parameter
    pub fn with_delta(mut self, delta: ParameterDelta) -> Self {
        self.deltas.retain(|d| d.parameter != delta.parameter);
        self.deltas.push(delta);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_templates() {
        let templates = ScenarioDefinition::templates();
        assert_eq!(templates.len(), 5);

        let cost = ScenarioDefinition::template(ScenarioKind::CostReduction);
        assert_eq!(cost.duration_months, 6);
        assert_eq!(cost.deltas.len(), 4);
        assert!(cost.deltas.iter().all(|d| d.parameter.is_cost()));

        let fundraising = ScenarioDefinition::template(ScenarioKind::Fundraising);
        assert_eq!(fundraising.duration_months, 18);
    }

    #[test]
    fn test_delta_application() {
        let relative = ParameterDelta::relative(ScenarioParameter::Cac, 0.15, ImpactWeight::Medium);
        assert_relative_eq!(relative.apply(1_000.0), 1_150.0);

        let absolute = ParameterDelta::absolute(ScenarioParameter::ChurnRate, 0.01, ImpactWeight::Low);
        assert_relative_eq!(absolute.apply(0.05), 0.06);
        assert_relative_eq!(absolute.relative_change(0.05), 0.2);
        assert_eq!(absolute.relative_change(0.0), 0.0);
    }

    #[test]
    fn test_with_delta_replaces() {
        let scenario = ScenarioDefinition::template(ScenarioKind::PricingIncrease)
            .with_delta(ParameterDelta::relative(ScenarioParameter::AveragePrice, 0.1, ImpactWeight::High));

        let price: Vec<&ParameterDelta> = scenario
            .deltas
            .iter()
            .filter(|d| d.parameter == ScenarioParameter::AveragePrice)
            .collect();
        assert_eq!(price.len(), 1);
        assert_eq!(price[0].change, 0.1);
    }

    #[test]
    fn test_parsing() {
        assert_eq!("market-downturn".parse::<ScenarioKind>().unwrap(), ScenarioKind::MarketDownturn);
        assert_eq!("price".parse::<ScenarioParameter>().unwrap(), ScenarioParameter::AveragePrice);
        assert!("headcount".parse::<ScenarioParameter>().is_err());
    }
}
