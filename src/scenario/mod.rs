//! What-if scenario simulation, comparison and ranking
//!
//! A [`ScenarioDefinition`] changes a few baseline parameters for a fixed number of
//! months. The [`ScenarioSimulator`] runs it through a simplified monthly loop,
//! compares the result with the baseline and classifies its impact and risks.
//! Batches run in parallel and are ranked by a risk-weighted score.

mod baseline;
mod batch;
mod comparison;
mod definition;
mod impact;
mod simulator;

pub use baseline::{OpexComponents, ScenarioBaseline, DEFAULT_MONTHLY_BURN, DEFAULT_RUNWAY_MONTHS};
pub use batch::{
    rank, score, BatchEntry, BatchReport, BatchSummary, BestScenario, HighRiskScenario, MetricExtremes,
    RankedScenario, ScenarioTradeoff,
};
pub use comparison::{compare, percent_change, ComparedMetric, MetricComparison, ScenarioComparison};
pub use definition::{
    ChangeKind, ImpactWeight, ParameterDelta, ScenarioDefinition, ScenarioKind, ScenarioParameter,
    DEFAULT_DURATION_MONTHS,
};
pub use impact::{
    GrowthLevel, ImpactAnalysis, MarketPosition, RiskAssessment, RiskLevel, RunwayLevel, ScaleLevel,
};
pub use simulator::{ScenarioMetrics, ScenarioMonth, ScenarioOutcome, ScenarioSimulator, SimulationConfig};
