//! Rule-based single-month recommendations
//!
//! Each month is checked against acquisition, unit-economics, runway and margin
//! thresholds. A recommendation carries the patch it proposes; automatic ones can be
//! applied in bulk, advisory ones only after the caller confirms them.

use crate::benchmarks::{BenchmarkMetric, StageBenchmarks};
use crate::projection::{MonthlyState, ProjectionSeries};
use serde::{Deserialize, Serialize};

const DEFAULT_LTV_CAC_TARGET: f64 = 3.0;
const PAYBACK_TOLERANCE: f64 = 1.5;
const LTV_CAC_TOLERANCE: f64 = 0.7;
const MIN_RUNWAY_MONTHS: f64 = 6.0;
const MIN_GROSS_MARGIN: f64 = 0.7;
const MAX_GROSS_MARGIN: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    ReduceCac,
    IncreaseLtv,
    ReduceBurn,
    ImproveMargin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

/// A proposed change to one month of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub month: u32,
    pub action: RecommendationAction,
    pub priority: Priority,
    /// Relative size of the change (0.2 = 20%)
    pub magnitude: f64,
    /// Applied without confirmation
    pub automatic: bool,
    pub title: String,
    pub description: String,
    pub suggestion: String,
}

impl Recommendation {
    /// Apply this patch to its month's drivers
    fn patch(&self, month: &mut MonthlyState) {
        let m = self.magnitude;
        match self.action {
            RecommendationAction::ReduceCac => {
                month.cac *= 1.0 - m;
                month.marketing_budget *= 1.0 - m;
                month.sales_budget *= 1.0 - m;
            }
            RecommendationAction::IncreaseLtv => {
                // Split between retention and expansion
                month.churn_rate *= 1.0 - m / 3.0;
                month.expansion_rate *= 1.0 + m;
                let added = month.expansion_revenue * m;
                month.expansion_revenue += added;
                month.mrr += added;
            }
            RecommendationAction::ReduceBurn => {
                month.opex = month.opex.scaled(1.0 - m);
            }
            RecommendationAction::ImproveMargin => {
                month.gross_margin = (month.gross_margin * (1.0 + m)).min(MAX_GROSS_MARGIN);
            }
        }
    }
}

/// Check every month against the recommendation thresholds
///
/// Without a benchmark table the payback target is the plan's own
/// `cac_payback_target` and the LTV/CAC target is 3.0.
pub fn analyze(series: &ProjectionSeries, benchmarks: Option<&StageBenchmarks>) -> Vec<Recommendation> {
    let payback_target = benchmarks
        .map(|b| b.target(BenchmarkMetric::CacPaybackMonths))
        .unwrap_or(series.context.cac_payback_target);
    let ltv_cac_target = benchmarks
        .map(|b| b.target(BenchmarkMetric::LtvCacRatio))
        .unwrap_or(DEFAULT_LTV_CAC_TARGET);

    let mut recommendations = Vec::new();

    for month in &series.months {
        if month.cac_payback_months > payback_target * PAYBACK_TOLERANCE {
            recommendations.push(Recommendation {
                month: month.month,
                action: RecommendationAction::ReduceCac,
                priority: Priority::High,
                magnitude: 0.2,
                automatic: true,
                title: "High CAC payback".to_string(),
                description: format!(
                    "CAC pays back in {:.1} months against a {:.0}-month target",
                    month.cac_payback_months, payback_target
                ),
                suggestion: "Lower CAC by reworking acquisition channels".to_string(),
            });
        }

        if month.ltv_cac_ratio < ltv_cac_target * LTV_CAC_TOLERANCE {
            recommendations.push(Recommendation {
                month: month.month,
                action: RecommendationAction::IncreaseLtv,
                priority: Priority::Medium,
                magnitude: 0.15,
                automatic: false,
                title: "Low LTV/CAC ratio".to_string(),
                description: format!(
                    "LTV/CAC of {:.1}x is below the {:.1}x target",
                    month.ltv_cac_ratio, ltv_cac_target
                ),
                suggestion: "Raise LTV through better retention or pricing".to_string(),
            });
        }

        if let Some(runway) = month.runway.finite() {
            if runway < MIN_RUNWAY_MONTHS {
                recommendations.push(Recommendation {
                    month: month.month,
                    action: RecommendationAction::ReduceBurn,
                    priority: Priority::Critical,
                    magnitude: 0.25,
                    automatic: true,
                    title: "Critically short runway".to_string(),
                    description: format!("Only {:.1} months of runway left", runway),
                    suggestion: "Cut spending or accelerate revenue".to_string(),
                });
            }
        }

        if month.gross_margin < MIN_GROSS_MARGIN {
            recommendations.push(Recommendation {
                month: month.month,
                action: RecommendationAction::ImproveMargin,
                priority: Priority::Medium,
                magnitude: 0.1,
                automatic: false,
                title: "Low gross margin".to_string(),
                description: format!(
                    "Gross margin of {:.1}% is below SaaS norms",
                    month.gross_margin * 100.0
                ),
                suggestion: "Reduce cost of revenue or raise prices".to_string(),
            });
        }
    }

    log::debug!("{} recommendations across {} months", recommendations.len(), series.len());
    recommendations
}

/// Apply every automatic recommendation and replay cash
pub fn apply_automatic(series: &ProjectionSeries, recommendations: &[Recommendation]) -> ProjectionSeries {
    let mut patched = series.clone();
    let mut applied = 0;

    for recommendation in recommendations.iter().filter(|r| r.automatic) {
        if patch_month(&mut patched, recommendation) {
            applied += 1;
        }
    }

    patched.recalculate();
    log::info!("Applied {} automatic recommendations", applied);
    patched
}

/// Apply one caller-confirmed recommendation, automatic or not, and replay cash
pub fn apply_confirmed(series: &ProjectionSeries, recommendation: &Recommendation) -> ProjectionSeries {
    let mut patched = series.clone();
    if patch_month(&mut patched, recommendation) {
        patched.recalculate();
    }
    patched
}

fn patch_month(series: &mut ProjectionSeries, recommendation: &Recommendation) -> bool {
    match series.months.iter_mut().find(|m| m.month == recommendation.month) {
        Some(month) => {
            recommendation.patch(month);
            true
        }
        None => {
            log::warn!(
                "Skipping {:?} recommendation for month {} outside the plan",
                recommendation.action,
                recommendation.month
            );
            false
        }
    }
}
