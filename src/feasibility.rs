//! Plan feasibility checks
//!
//! The evaluator only reads the series. Every input, including an empty or
//! all-zero series, produces a report; degenerate input shows up as findings.

use crate::benchmarks::{BenchmarkAssessment, BenchmarkMetric, StageBenchmarks};
use crate::math::{mean, period_growth_rates};
use crate::projection::ProjectionSeries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCode {
    AggressiveGrowth,
    LowLtvCac,
    LowRunway,
    LongCacPayback,
    TeamScaling,
    EmptySeries,
    NoRevenue,
    NoCustomers,
    DegradedMetrics,
}

/// A problem found in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

impl Finding {
    fn new(code: FindingCode, severity: Severity, message: String, suggestion: &str) -> Self {
        Self {
            code,
            severity,
            message,
            suggestion: suggestion.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// Problems that undermine the plan
    pub issues: Vec<Finding>,
    /// Risks worth watching
    pub warnings: Vec<Finding>,
    /// 0 (infeasible) to 100
    pub score: f64,
    pub advice: Vec<String>,
    /// Plan metrics graded against stage benchmarks, empty without a table
    pub benchmarks: Vec<BenchmarkAssessment>,
}

impl FeasibilityReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.issues.iter().chain(self.warnings.iter())
    }

    pub fn has_finding(&self, code: FindingCode) -> bool {
        self.findings().any(|f| f.code == code)
    }
}

/// Thresholds for the feasibility checks
#[derive(Debug, Clone)]
pub struct FeasibilityConfig {
    /// Average month-over-month revenue growth considered aggressive
    pub max_avg_growth: f64,
    pub min_avg_ltv_cac: f64,
    pub min_runway_months: f64,
    pub max_avg_cac_payback: f64,
    /// MRR one team member can support
    pub mrr_per_team_member: f64,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            max_avg_growth: 0.5,
            min_avg_ltv_cac: 2.0,
            min_runway_months: 6.0,
            max_avg_cac_payback: 18.0,
            mrr_per_team_member: 50_000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeasibilityEvaluator {
    config: FeasibilityConfig,
}

impl FeasibilityEvaluator {
    pub fn new(config: FeasibilityConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, series: &ProjectionSeries, benchmarks: Option<&StageBenchmarks>) -> FeasibilityReport {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut assessments = Vec::new();

        if series.is_empty() {
            issues.push(Finding::new(
                FindingCode::EmptySeries,
                Severity::Critical,
                "The plan has no months".to_string(),
                "Generate a projection before evaluating it",
            ));
        } else {
            self.check_degeneracy(series, &mut warnings);
            self.check_growth(series, benchmarks, &mut warnings, &mut assessments);
            self.check_unit_economics(series, benchmarks, &mut issues, &mut warnings, &mut assessments);
            self.check_runway(series, benchmarks, &mut issues, &mut assessments);
            self.check_team(series, &mut warnings);
        }

        let score = feasibility_score(&issues, &warnings);
        let advice = advice(&issues, &warnings);

        log::info!(
            "Feasibility: score {:.0}, {} issues, {} warnings",
            score,
            issues.len(),
            warnings.len()
        );

        FeasibilityReport {
            issues,
            warnings,
            score,
            advice,
            benchmarks: assessments,
        }
    }

    fn check_degeneracy(&self, series: &ProjectionSeries, warnings: &mut Vec<Finding>) {
        if series.months.iter().all(|m| m.total_revenue == 0.0) {
            warnings.push(Finding::new(
                FindingCode::NoRevenue,
                Severity::Medium,
                "The plan has no revenue in any month".to_string(),
                "Check starting MRR and growth assumptions",
            ));
        }
        if series.months.iter().all(|m| m.customers == 0.0) {
            warnings.push(Finding::new(
                FindingCode::NoCustomers,
                Severity::Low,
                "The plan has no customers in any month".to_string(),
                "Check the starting customer count",
            ));
        }
        if !series.warnings.is_empty() {
            warnings.push(Finding::new(
                FindingCode::DegradedMetrics,
                Severity::Low,
                format!("{} metrics fell back to defaults on zero denominators", series.warnings.len()),
                "Review the months with missing customers, revenue or CAC",
            ));
        }
    }

    fn check_growth(
        &self,
        series: &ProjectionSeries,
        benchmarks: Option<&StageBenchmarks>,
        warnings: &mut Vec<Finding>,
        assessments: &mut Vec<BenchmarkAssessment>,
    ) {
        let avg_growth = mean(&period_growth_rates(&series.revenue()));

        if avg_growth > self.config.max_avg_growth {
            warnings.push(Finding::new(
                FindingCode::AggressiveGrowth,
                Severity::Medium,
                format!("Average monthly growth of {:.1}% may be too aggressive", avg_growth * 100.0),
                "Consider a more conservative growth scenario",
            ));
        }
        if let Some(table) = benchmarks {
            assessments.push(table.assess(BenchmarkMetric::MrrGrowthMonthly, avg_growth));
        }
    }

    fn check_unit_economics(
        &self,
        series: &ProjectionSeries,
        benchmarks: Option<&StageBenchmarks>,
        issues: &mut Vec<Finding>,
        warnings: &mut Vec<Finding>,
        assessments: &mut Vec<BenchmarkAssessment>,
    ) {
        let ratios: Vec<f64> = series.months.iter().map(|m| m.ltv_cac_ratio).collect();
        let avg_ltv_cac = mean(&ratios);

        if avg_ltv_cac < self.config.min_avg_ltv_cac {
            issues.push(Finding::new(
                FindingCode::LowLtvCac,
                Severity::High,
                format!("Average LTV/CAC of {:.1}x is below the recommended minimum", avg_ltv_cac),
                "Improve retention or lower CAC",
            ));
        }

        let paybacks: Vec<f64> = series.months.iter().map(|m| m.cac_payback_months).collect();
        let avg_payback = mean(&paybacks);

        if avg_payback > self.config.max_avg_cac_payback {
            warnings.push(Finding::new(
                FindingCode::LongCacPayback,
                Severity::Medium,
                format!("Average CAC payback of {:.1} months is too long", avg_payback),
                "Optimize acquisition channels",
            ));
        }

        if let Some(table) = benchmarks {
            assessments.push(table.assess(BenchmarkMetric::LtvCacRatio, avg_ltv_cac));
            assessments.push(table.assess(BenchmarkMetric::CacPaybackMonths, avg_payback));
        }
    }

    fn check_runway(
        &self,
        series: &ProjectionSeries,
        benchmarks: Option<&StageBenchmarks>,
        issues: &mut Vec<Finding>,
        assessments: &mut Vec<BenchmarkAssessment>,
    ) {
        let Some(min_runway) = series.min_finite_runway() else {
            return;
        };

        if min_runway < self.config.min_runway_months {
            issues.push(Finding::new(
                FindingCode::LowRunway,
                Severity::Critical,
                format!("Minimum runway of {:.1} months risks running out of cash", min_runway),
                "Cut spending or accelerate fundraising",
            ));
        }
        if let Some(table) = benchmarks {
            assessments.push(table.assess(BenchmarkMetric::RunwayMonths, min_runway));
        }
    }

    fn check_team(&self, series: &ProjectionSeries, warnings: &mut Vec<Finding>) {
        let team_size = series.context.team_size as f64;
        let overloaded = series
            .months
            .iter()
            .find(|m| m.total_revenue / self.config.mrr_per_team_member > team_size);

        if let Some(month) = overloaded {
            warnings.push(Finding::new(
                FindingCode::TeamScaling,
                Severity::Low,
                format!(
                    "MRR of {:.0} in month {} may need a larger team",
                    month.total_revenue, month.month
                ),
                "Plan hiring ahead of growth",
            ));
        }
    }
}

/// Evaluate with default thresholds
pub fn evaluate(series: &ProjectionSeries, benchmarks: Option<&StageBenchmarks>) -> FeasibilityReport {
    FeasibilityEvaluator::default().evaluate(series, benchmarks)
}

fn issue_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 30.0,
        Severity::High => 20.0,
        Severity::Medium => 10.0,
        Severity::Low => 2.0,
    }
}

fn warning_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 30.0,
        Severity::High => 20.0,
        Severity::Medium => 5.0,
        Severity::Low => 2.0,
    }
}

/// 100 minus severity weights, clamped to [0, 100]
pub fn feasibility_score(issues: &[Finding], warnings: &[Finding]) -> f64 {
    let penalty: f64 = issues.iter().map(|f| issue_weight(f.severity)).sum::<f64>()
        + warnings.iter().map(|f| warning_weight(f.severity)).sum::<f64>();
    (100.0 - penalty).clamp(0.0, 100.0)
}

fn advice(issues: &[Finding], warnings: &[Finding]) -> Vec<String> {
    let mut advice: Vec<String> = issues
        .iter()
        .map(|f| format!("Fix: {}", f.suggestion))
        .chain(warnings.iter().map(|f| format!("Consider: {}", f.suggestion)))
        .collect();

    let closing = if issues.is_empty() && warnings.is_empty() {
        "The plan looks realistic and is ready to execute."
    } else if !issues.is_empty() {
        "Resolve the issues first, then revisit the plan."
    } else {
        "Keep the warnings in mind while executing the plan."
    };
    advice.push(closing.to_string());
    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{MonthlyState, SeriesContext};

    fn context(team_size: u32) -> SeriesContext {
        SeriesContext {
            starting_cash: 1_000_000.0,
            price_per_customer: 100.0,
            cloud_cost_per_customer: 0.0,
            team_size,
            marketing_ops_ratio: 0.05,
            cac_payback_target: 12.0,
        }
    }

    fn healthy_month(n: u32) -> MonthlyState {
        let mut m = MonthlyState::new(n);
        m.mrr = 20_000.0 * 1.05_f64.powi(n as i32);
        m.customers = m.mrr / 100.0;
        m.churn_rate = 0.02;
        m.cac = 600.0;
        m.gross_margin = 0.8;
        m.opex.salaries = 10_000.0;
        m
    }

    fn healthy_series() -> ProjectionSeries {
        ProjectionSeries::new(context(5), (1..=12).map(healthy_month).collect())
    }

    #[test]
    fn test_healthy_plan_scores_full() {
        let report = evaluate(&healthy_series(), None);

        assert!(!report.has_issues());
        assert!(!report.has_warnings());
        assert_eq!(report.score, 100.0);
        assert_eq!(report.advice.len(), 1);
        assert!(report.benchmarks.is_empty());
    }

    #[test]
    fn test_low_runway_is_critical() {
        let mut series = healthy_series();
        series.context.starting_cash = 5_000.0;
        for m in &mut series.months {
            m.opex.salaries = 60_000.0;
        }
        series.recalculate();
        let report = evaluate(&series, None);

        assert!(report.has_finding(FindingCode::LowRunway));
        assert!(report.issues.iter().any(|f| f.severity == Severity::Critical));
        assert_eq!(report.score, 70.0);
    }

    #[test]
    fn test_aggressive_growth_and_team_scaling() {
        let months = (1..=12)
            .map(|n| {
                let mut m = healthy_month(n);
                m.mrr = 10_000.0 * 2.0_f64.powi(n as i32 - 1);
                m.customers = m.mrr / 100.0;
                m
            })
            .collect();
        let report = evaluate(&ProjectionSeries::new(context(2), months), None);

        assert!(report.has_finding(FindingCode::AggressiveGrowth));
        assert!(report.has_finding(FindingCode::TeamScaling));
        assert_eq!(report.score, 93.0);
    }

    #[test]
    fn test_poor_unit_economics() {
        let mut series = healthy_series();
        for m in &mut series.months {
            m.cac = 50_000.0;
        }
        series.recalculate();
        let report = evaluate(&series, None);

        assert!(report.has_finding(FindingCode::LowLtvCac));
        assert!(report.has_finding(FindingCode::LongCacPayback));
        assert_eq!(report.score, 75.0);
    }

    #[test]
    fn test_empty_series() {
        let series = ProjectionSeries::new(context(5), Vec::new());
        let report = evaluate(&series, None);

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, FindingCode::EmptySeries);
        assert_eq!(report.score, 70.0);
    }

    #[test]
    fn test_all_zero_series_is_total() {
        let series = ProjectionSeries::new(context(5), (1..=12).map(MonthlyState::new).collect());
        let report = evaluate(&series, Some(&StageBenchmarks::seed()));

        assert!(report.has_finding(FindingCode::NoRevenue));
        assert!(report.has_finding(FindingCode::NoCustomers));
        assert!(report.has_finding(FindingCode::DegradedMetrics));
        assert!(report.has_finding(FindingCode::LowLtvCac));
        assert!((0.0..=100.0).contains(&report.score));
    }

    #[test]
    fn test_score_is_clamped() {
        let many: Vec<Finding> = (0..5)
            .map(|_| Finding::new(FindingCode::LowRunway, Severity::Critical, String::new(), ""))
            .collect();
        assert_eq!(feasibility_score(&many, &[]), 0.0);
    }

    #[test]
    fn test_benchmark_assessments() {
        let mut series = healthy_series();
        series.months[3].opex.salaries = 200_000.0;
        series.recalculate();
        let report = evaluate(&series, Some(&StageBenchmarks::pre_seed()));

        let metrics: Vec<BenchmarkMetric> = report.benchmarks.iter().map(|a| a.metric).collect();
        assert_eq!(
            metrics,
            vec![
                BenchmarkMetric::MrrGrowthMonthly,
                BenchmarkMetric::LtvCacRatio,
                BenchmarkMetric::CacPaybackMonths,
                BenchmarkMetric::RunwayMonths,
            ]
        );
    }
}
