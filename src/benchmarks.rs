//! Stage-aware SaaS benchmark tables
//!
//! Each metric carries poor/average/good/excellent thresholds and a target. A range
//! whose `poor` threshold lies above its `excellent` one is read as lower-is-better
//! (CAC payback, churn, burn ratio).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Funding stage of the company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStage {
    PreSeed,
    Seed,
    SeriesA,
}

impl CompanyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStage::PreSeed => "pre_seed",
            CompanyStage::Seed => "seed",
            CompanyStage::SeriesA => "series_a",
        }
    }
}

impl fmt::Display for CompanyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pre_seed" | "preseed" => Ok(CompanyStage::PreSeed),
            "seed" => Ok(CompanyStage::Seed),
            "series_a" | "seriesa" => Ok(CompanyStage::SeriesA),
            other => Err(format!("unknown company stage `{}`", other)),
        }
    }
}

/// Metrics with stage benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkMetric {
    MrrGrowthMonthly,
    CacPaybackMonths,
    LtvCacRatio,
    BurnToMrrRatio,
    GrossMargin,
    MonthlyChurnRate,
    RunwayMonths,
}

/// Thresholds for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    pub poor: f64,
    pub average: f64,
    pub good: f64,
    pub excellent: f64,
    pub target: f64,
}

impl BenchmarkRange {
    pub const fn new(poor: f64, average: f64, good: f64, excellent: f64, target: f64) -> Self {
        Self { poor, average, good, excellent, target }
    }

    pub fn higher_is_better(&self) -> bool {
        self.excellent >= self.poor
    }

    /// Grade a value against the thresholds
    pub fn status(&self, value: f64) -> BenchmarkStatus {
        // Negate lower-is-better ranges so one set of comparisons serves both
        let (v, poor, average, good, excellent) = if self.higher_is_better() {
            (value, self.poor, self.average, self.good, self.excellent)
        } else {
            (-value, -self.poor, -self.average, -self.good, -self.excellent)
        };

        if v <= poor {
            BenchmarkStatus::Critical
        } else if v <= average {
            BenchmarkStatus::Warning
        } else if v <= good {
            BenchmarkStatus::Good
        } else if v <= excellent {
            BenchmarkStatus::Excellent
        } else {
            BenchmarkStatus::Outstanding
        }
    }
}

/// Grade of a metric against its benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Critical,
    Warning,
    Good,
    Excellent,
    Outstanding,
}

impl BenchmarkStatus {
    /// 1 (critical) to 5 (outstanding)
    pub fn score(&self) -> u8 {
        *self as u8 + 1
    }
}

/// A metric value graded against its benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAssessment {
    pub metric: BenchmarkMetric,
    pub value: f64,
    pub status: BenchmarkStatus,
    pub target: f64,
    /// Percent deviation from the target
    pub deviation_pct: f64,
}

/// Benchmark table for one company stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBenchmarks {
    pub stage: CompanyStage,
    pub mrr_growth_monthly: BenchmarkRange,
    pub cac_payback_months: BenchmarkRange,
    pub ltv_cac_ratio: BenchmarkRange,
    pub burn_to_mrr_ratio: BenchmarkRange,
    pub gross_margin: BenchmarkRange,
    pub monthly_churn_rate: BenchmarkRange,
    pub runway_months: BenchmarkRange,
}

impl StageBenchmarks {
    /// Built-in table for a stage
    pub fn for_stage(stage: CompanyStage) -> Self {
        match stage {
            CompanyStage::PreSeed => Self::pre_seed(),
            CompanyStage::Seed => Self::seed(),
            CompanyStage::SeriesA => Self::series_a(),
        }
    }

    pub fn pre_seed() -> Self {
        Self {
            stage: CompanyStage::PreSeed,
            mrr_growth_monthly: BenchmarkRange::new(0.05, 0.10, 0.20, 0.30, 0.20),
            cac_payback_months: BenchmarkRange::new(24.0, 18.0, 12.0, 9.0, 12.0),
            ltv_cac_ratio: BenchmarkRange::new(1.5, 2.5, 3.5, 5.0, 3.5),
            burn_to_mrr_ratio: BenchmarkRange::new(3.0, 2.0, 1.5, 1.0, 1.5),
            gross_margin: BenchmarkRange::new(0.60, 0.70, 0.80, 0.90, 0.80),
            monthly_churn_rate: BenchmarkRange::new(0.10, 0.07, 0.05, 0.03, 0.05),
            runway_months: BenchmarkRange::new(3.0, 6.0, 12.0, 18.0, 12.0),
        }
    }

    pub fn seed() -> Self {
        Self {
            stage: CompanyStage::Seed,
            mrr_growth_monthly: BenchmarkRange::new(0.10, 0.15, 0.25, 0.40, 0.25),
            cac_payback_months: BenchmarkRange::new(18.0, 12.0, 9.0, 6.0, 9.0),
            runway_months: BenchmarkRange::new(6.0, 9.0, 12.0, 18.0, 12.0),
            ..Self::pre_seed()
        }
    }

    pub fn series_a() -> Self {
        Self {
            stage: CompanyStage::SeriesA,
            mrr_growth_monthly: BenchmarkRange::new(0.08, 0.12, 0.18, 0.25, 0.18),
            ltv_cac_ratio: BenchmarkRange::new(2.0, 3.0, 4.0, 5.0, 4.0),
            ..Self::seed()
        }
    }

    pub fn range(&self, metric: BenchmarkMetric) -> &BenchmarkRange {
        match metric {
            BenchmarkMetric::MrrGrowthMonthly => &self.mrr_growth_monthly,
            BenchmarkMetric::CacPaybackMonths => &self.cac_payback_months,
            BenchmarkMetric::LtvCacRatio => &self.ltv_cac_ratio,
            BenchmarkMetric::BurnToMrrRatio => &self.burn_to_mrr_ratio,
            BenchmarkMetric::GrossMargin => &self.gross_margin,
            BenchmarkMetric::MonthlyChurnRate => &self.monthly_churn_rate,
            BenchmarkMetric::RunwayMonths => &self.runway_months,
        }
    }

    pub fn target(&self, metric: BenchmarkMetric) -> f64 {
        self.range(metric).target
    }

    /// Grade a value against this stage's table
    pub fn assess(&self, metric: BenchmarkMetric, value: f64) -> BenchmarkAssessment {
        let range = self.range(metric);
        let deviation_pct = if range.target != 0.0 {
            (value - range.target) / range.target * 100.0
        } else {
            0.0
        };

        BenchmarkAssessment {
            metric,
            value,
            status: range.status(value),
            target: range.target,
            deviation_pct,
        }
    }
}
