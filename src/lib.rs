//! Runway Planner - 12-month financial projection engine for early-stage SaaS companies
//!
//! This library provides:
//! - Month-by-month MRR, customer, cost and cash projections
//! - Optimization strategies (runway, growth, profitability) and rule-based recommendations
//! - Feasibility scoring with optional stage benchmarks
//! - What-if scenario simulation, comparison and parallel ranking
//! - Plan orchestration with injected storage and narrative collaborators

pub mod math;
pub mod error;
pub mod assumptions;
pub mod projection;
pub mod optimization;
pub mod benchmarks;
pub mod feasibility;
pub mod company;
pub mod scenario;
pub mod storage;
pub mod planner;

// Re-export commonly used types
pub use error::{PlanError, ScenarioError, StoreError, NarrativeError};
pub use assumptions::{PlanAssumptions, Seasonality, CapexItem};
pub use projection::{ProjectionEngine, ProjectionConfig, ProjectionSeries, MonthlyState, Runway, PlanSummary};
pub use optimization::{OptimizationObjective, OptimizationStrategy, Recommendation, optimize};
pub use benchmarks::{CompanyStage, StageBenchmarks};
pub use feasibility::{FeasibilityEvaluator, FeasibilityReport};
pub use company::CompanyProfile;
pub use scenario::{ScenarioBaseline, ScenarioDefinition, ScenarioKind, ScenarioOutcome, ScenarioSimulator};
pub use storage::{PlanStore, Narrator, InMemoryPlanStore, JsonFilePlanStore};
pub use planner::{FinancialPlan, PlanRequest, PlanningService};
