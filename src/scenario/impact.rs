//! Impact classification, risk assessment and scenario recommendations

use super::baseline::ScenarioBaseline;
use super::comparison::{ComparedMetric, ScenarioComparison};
use super::definition::{ScenarioDefinition, ScenarioKind};
use super::simulator::ScenarioMetrics;
use crate::math::std_dev;
use crate::projection::Runway;
use serde::{Deserialize, Serialize};

/// Minimum cash before cash risk drops to low
pub const CASH_RISK_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunwayLevel {
    Excellent,
    VeryGood,
    Good,
    Warning,
    Concerning,
    Critical,
    Emergency,
}

impl RunwayLevel {
    pub fn classify(runway: Runway) -> Self {
        let months = match runway {
            Runway::Unlimited => return RunwayLevel::Excellent,
            Runway::Months(months) => months,
        };
        match months {
            m if m > 24.0 => RunwayLevel::Excellent,
            m if m >= 18.0 => RunwayLevel::VeryGood,
            m if m >= 12.0 => RunwayLevel::Good,
            m if m >= 9.0 => RunwayLevel::Warning,
            m if m >= 6.0 => RunwayLevel::Concerning,
            m if m >= 3.0 => RunwayLevel::Critical,
            _ => RunwayLevel::Emergency,
        }
    }
}

/// Company scale by MRR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleLevel {
    Enterprise,
    Growth,
    Established,
    EarlyTraction,
    PreRevenue,
}

impl ScaleLevel {
    pub fn classify(mrr: f64) -> Self {
        match mrr {
            m if m >= 10_000_000.0 => ScaleLevel::Enterprise,
            m if m >= 1_000_000.0 => ScaleLevel::Growth,
            m if m >= 100_000.0 => ScaleLevel::Established,
            m if m >= 10_000.0 => ScaleLevel::EarlyTraction,
            _ => ScaleLevel::PreRevenue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthLevel {
    Hypergrowth,
    HighGrowth,
    StrongGrowth,
    ModerateGrowth,
    SlowGrowth,
}

impl GrowthLevel {
    /// Classify an average monthly growth rate (0.2 = 20%)
    pub fn classify(monthly_growth: f64) -> Self {
        match monthly_growth * 100.0 {
            g if g >= 20.0 => GrowthLevel::Hypergrowth,
            g if g >= 15.0 => GrowthLevel::HighGrowth,
            g if g >= 10.0 => GrowthLevel::StrongGrowth,
            g if g >= 5.0 => GrowthLevel::ModerateGrowth,
            _ => GrowthLevel::SlowGrowth,
        }
    }
}

/// Market position by customer count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    MarketLeader,
    EstablishedPlayer,
    GrowingPresence,
    EarlyAdopters,
    VeryEarly,
}

impl MarketPosition {
    pub fn classify(customers: f64) -> Self {
        match customers {
            c if c >= 10_000.0 => MarketPosition::MarketLeader,
            c if c >= 1_000.0 => MarketPosition::EstablishedPlayer,
            c if c >= 100.0 => MarketPosition::GrowingPresence,
            c if c >= 10.0 => MarketPosition::EarlyAdopters,
            _ => MarketPosition::VeryEarly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub cash: RiskLevel,
    pub growth: RiskLevel,
    pub execution: RiskLevel,
    pub market: RiskLevel,
}

impl RiskAssessment {
    /// Names of the risks rated high or critical
    pub fn high_risks(&self) -> Vec<&'static str> {
        [
            ("cash", self.cash),
            ("growth", self.growth),
            ("execution", self.execution),
            ("market", self.market),
        ]
        .iter()
        .filter(|(_, level)| level.is_high())
        .map(|(name, _)| *name)
        .collect()
    }

    /// Ranking multiplier drawn from the cash risk
    pub fn ranking_factor(&self) -> f64 {
        match self.cash {
            RiskLevel::High | RiskLevel::Critical => 0.5,
            RiskLevel::Medium => 0.9,
            RiskLevel::Low | RiskLevel::Unknown => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub runway: RunwayLevel,
    pub scale: ScaleLevel,
    pub growth: GrowthLevel,
    pub market_position: MarketPosition,
    /// ARR times a growth-dependent revenue multiple
    pub estimated_valuation: f64,
    pub risks: RiskAssessment,
    pub key_drivers: Vec<ComparedMetric>,
}

impl ImpactAnalysis {
    pub fn assess(
        definition: &ScenarioDefinition,
        baseline: &ScenarioBaseline,
        metrics: &ScenarioMetrics,
        comparison: &ScenarioComparison,
    ) -> Self {
        Self {
            runway: RunwayLevel::classify(metrics.ending_runway),
            scale: ScaleLevel::classify(metrics.ending_mrr),
            growth: GrowthLevel::classify(metrics.avg_monthly_growth),
            market_position: MarketPosition::classify(metrics.ending_customers),
            estimated_valuation: estimated_valuation(metrics.ending_mrr, metrics.avg_monthly_growth),
            risks: RiskAssessment {
                cash: cash_risk(metrics.min_cash),
                growth: growth_risk(definition.duration_months, &metrics.growth_rates, metrics.avg_monthly_growth),
                execution: execution_risk(definition, baseline),
                market: RiskLevel::Medium,
            },
            key_drivers: comparison.key_drivers(),
        }
    }
}

/// ARR at 10x for ≥15% monthly growth, 8x for ≥10%, 6x otherwise
pub fn estimated_valuation(mrr: f64, monthly_growth: f64) -> f64 {
    let multiple = if monthly_growth >= 0.15 {
        10.0
    } else if monthly_growth >= 0.1 {
        8.0
    } else {
        6.0
    };
    mrr * 12.0 * multiple
}

pub fn cash_risk(min_cash: f64) -> RiskLevel {
    if min_cash <= 0.0 {
        RiskLevel::High
    } else if min_cash < CASH_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Growth risk from the month-over-month rates of a series
pub fn growth_risk(months: u32, growth_rates: &[f64], avg_growth: f64) -> RiskLevel {
    if months < 3 {
        return RiskLevel::Unknown;
    }
    if growth_rates.is_empty() {
        return RiskLevel::High;
    }
    if avg_growth <= 0.0 {
        RiskLevel::Critical
    } else if avg_growth < 0.05 {
        RiskLevel::High
    } else if std_dev(growth_rates) > avg_growth {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Execution risk from the number of aggressive changes
///
/// Growth drivers raised by more than 30% and costs cut by more than 20% each count.
pub fn execution_risk(definition: &ScenarioDefinition, baseline: &ScenarioBaseline) -> RiskLevel {
    let aggressive = definition
        .deltas
        .iter()
        .filter(|delta| {
            let change = delta.relative_change(baseline.value(delta.parameter));
            (delta.parameter.is_growth_driver() && change > 0.3) || (delta.parameter.is_cost() && change < -0.2)
        })
        .count();

    match aggressive {
        n if n >= 3 => RiskLevel::High,
        2 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Action items for a simulated scenario
pub fn recommend(kind: ScenarioKind, impact: &ImpactAnalysis, metrics: &ScenarioMetrics) -> Vec<String> {
    let by_kind: &[&str] = match kind {
        ScenarioKind::GrowthAcceleration => &[
            "Validate acquisition channels can absorb more spend before scaling",
            "Hire sales and customer success ahead of demand",
            "Track CAC payback monthly as the budget grows",
        ],
        ScenarioKind::CostReduction => &[
            "Cut costs that do not slow revenue growth first",
            "Renegotiate vendor and infrastructure contracts",
            "Keep the team informed to limit attrition",
        ],
        ScenarioKind::Fundraising => &[
            "Tie new spending to the milestones for the next round",
            "Keep at least 18 months of runway after hiring",
            "Set up investor reporting on MRR, burn and runway",
        ],
        ScenarioKind::MarketDownturn => &[
            "Defer non-critical spend to extend runway",
            "Focus retention on the highest-value accounts",
        ],
        ScenarioKind::PricingIncrease => &[
            "Grandfather at-risk accounts on current pricing",
            "Ship visible product improvements alongside the price change",
        ],
        ScenarioKind::Custom => &[],
    };
    let mut recommendations: Vec<String> = by_kind.iter().map(|s| s.to_string()).collect();

    if impact.risks.cash.is_high() {
        recommendations.push("Prepare a contingency plan: cash runs out in this scenario".to_string());
    }
    if impact.risks.growth.is_high() {
        recommendations.push("Diversify acquisition channels to stabilize growth".to_string());
    }
    match metrics.breakeven_month {
        Some(month) if month <= 12 => {
            recommendations.push(format!("Focus on reaching breakeven by month {}", month));
        }
        Some(month) if month > 24 => {
            recommendations.push("Accelerate the path to profitability".to_string());
        }
        _ => {}
    }

    recommendations
}
