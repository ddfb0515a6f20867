//! Plan orchestration
//!
//! assumptions -> projection -> optimization passes -> recommendations ->
//! feasibility -> summary, then the optional narrator and store. Collaborator
//! failures are logged and recorded on the plan; they never change its numbers.

use crate::assumptions::PlanAssumptions;
use crate::benchmarks::{CompanyStage, StageBenchmarks};
use crate::error::PlanError;
use crate::feasibility::{FeasibilityConfig, FeasibilityEvaluator, FeasibilityReport};
use crate::optimization::{analyze, apply_automatic, apply_confirmed, optimize, OptimizationObjective, Recommendation};
use crate::projection::{PlanSummary, ProjectionEngine, ProjectionSeries};
use crate::storage::{Narrator, PlanStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What to plan for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub assumptions: PlanAssumptions,
    /// Applied in order, each on the previous one's output
    #[serde(default)]
    pub objectives: Vec<OptimizationObjective>,
    /// Benchmark table for recommendation thresholds and labels
    #[serde(default)]
    pub stage: Option<CompanyStage>,
}

impl PlanRequest {
    pub fn new(assumptions: PlanAssumptions) -> Self {
        Self {
            assumptions,
            objectives: Vec::new(),
            stage: None,
        }
    }

    pub fn with_objectives(mut self, objectives: Vec<OptimizationObjective>) -> Self {
        self.objectives = objectives;
        self
    }

    pub fn with_stage(mut self, stage: CompanyStage) -> Self {
        self.stage = Some(stage);
        self
    }
}

/// A finished 12-month plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialPlan {
    pub plan_name: String,
    pub plan_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub assumptions: PlanAssumptions,
    pub objectives: Vec<OptimizationObjective>,
    pub stage: Option<CompanyStage>,
    /// Summary of the projection before any optimization
    pub baseline_summary: PlanSummary,
    /// Final series: optimized, with automatic recommendations applied
    pub projection: ProjectionSeries,
    /// Every recommendation, automatic and advisory
    pub recommendations: Vec<Recommendation>,
    pub feasibility: FeasibilityReport,
    pub summary: PlanSummary,
    #[serde(default)]
    pub narrative: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub storage_error: Option<String>,
}

impl FinancialPlan {
    /// Advisory recommendations still waiting for confirmation
    pub fn pending_recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter().filter(|r| !r.automatic)
    }

    pub fn benchmarks(&self) -> Option<StageBenchmarks> {
        self.stage.map(StageBenchmarks::for_stage)
    }
}

/// Builds plans with injected persistence and narrative
pub struct PlanningService {
    engine: ProjectionEngine,
    evaluator: FeasibilityEvaluator,
    store: Option<Box<dyn PlanStore>>,
    narrator: Option<Box<dyn Narrator>>,
}

impl PlanningService {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self {
            engine,
            evaluator: FeasibilityEvaluator::new(FeasibilityConfig::default()),
            store: None,
            narrator: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: FeasibilityEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_store(mut self, store: Box<dyn PlanStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Project, optimize, review and score a plan
    ///
    /// Only invalid assumptions fail; storage and narrative problems are
    /// reported on the returned plan.
    pub fn create_plan(&self, request: &PlanRequest) -> Result<FinancialPlan, PlanError> {
        let projected = self.engine.project(&request.assumptions)?;
        let baseline_summary = projected.summary();

        let optimized = optimize(&projected, &request.objectives);
        let benchmarks = request.stage.map(StageBenchmarks::for_stage);
        let recommendations = analyze(&optimized, benchmarks.as_ref());
        let projection = apply_automatic(&optimized, &recommendations);

        let feasibility = self.evaluator.evaluate(&projection, benchmarks.as_ref());
        let summary = projection.summary();

        log::info!(
            "Plan '{}': feasibility {:.0}, ending cash {:.2}, {} recommendations",
            request.assumptions.plan_name,
            feasibility.score,
            summary.ending_cash,
            recommendations.len()
        );

        let mut plan = FinancialPlan {
            plan_name: request.assumptions.plan_name.clone(),
            plan_year: request.assumptions.plan_year,
            created_at: Utc::now(),
            assumptions: request.assumptions.clone(),
            objectives: request.objectives.clone(),
            stage: request.stage,
            baseline_summary,
            projection,
            recommendations,
            feasibility,
            summary,
            narrative: None,
            plan_id: None,
            storage_error: None,
        };

        self.annotate(&mut plan);
        self.persist(&mut plan);
        Ok(plan)
    }

    /// Apply a confirmed advisory recommendation and re-score the plan
    pub fn confirm_recommendation(&self, plan: &FinancialPlan, recommendation: &Recommendation) -> FinancialPlan {
        let projection = apply_confirmed(&plan.projection, recommendation);
        let benchmarks = plan.benchmarks();

        let mut updated = plan.clone();
        updated.feasibility = self.evaluator.evaluate(&projection, benchmarks.as_ref());
        updated.summary = projection.summary();
        updated.projection = projection;
        updated.recommendations.retain(|r| r != recommendation);
        updated
    }

    fn annotate(&self, plan: &mut FinancialPlan) {
        let Some(narrator) = &self.narrator else {
            return;
        };
        match narrator.narrate(plan) {
            Ok(text) => plan.narrative = Some(text),
            Err(e) => log::warn!("Narrative for '{}' unavailable: {}", plan.plan_name, e),
        }
    }

    fn persist(&self, plan: &mut FinancialPlan) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save(plan) {
            Ok(id) => plan.plan_id = Some(id),
            Err(e) => {
                log::warn!("Could not store plan '{}': {}", plan.plan_name, e);
                plan.storage_error = Some(e.to_string());
            }
        }
    }
}

impl Default for PlanningService {
    fn default() -> Self {
        Self::new(ProjectionEngine::default())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_assumptions;
    use super::*;
    use crate::error::{NarrativeError, StoreError};
    use crate::storage::{InMemoryPlanStore, StoredPlan};
    use approx::assert_relative_eq;

    struct BrokenStore;

    impl PlanStore for BrokenStore {
        fn save(&self, _plan: &FinancialPlan) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("database offline".to_string()))
        }

        fn load(&self, id: &str) -> Result<StoredPlan, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        fn list(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct FixedNarrator(Result<String, String>);

    impl Narrator for FixedNarrator {
        fn narrate(&self, plan: &FinancialPlan) -> Result<String, NarrativeError> {
            match &self.0 {
                Ok(text) => Ok(format!("{}: {}", plan.plan_name, text)),
                Err(e) => Err(NarrativeError::Unavailable(e.clone())),
            }
        }
    }

    #[test]
    fn test_plan_without_collaborators() {
        let plan = PlanningService::default()
            .create_plan(&PlanRequest::new(sample_assumptions()))
            .unwrap();

        assert_eq!(plan.projection.len(), 12);
        assert!(plan.narrative.is_none());
        assert!(plan.plan_id.is_none());
        assert!(plan.storage_error.is_none());
        assert!((0.0..=100.0).contains(&plan.feasibility.score));
        assert!(plan.feasibility.benchmarks.is_empty());
    }

    #[test]
    fn test_invalid_assumptions_rejected() {
        let mut assumptions = sample_assumptions();
        assumptions.churn_rate = 1.5;
        let result = PlanningService::default().create_plan(&PlanRequest::new(assumptions));
        assert!(matches!(result, Err(PlanError::InvalidAssumption { field: "churn_rate", .. })));
    }

    #[test]
    fn test_store_failure_does_not_change_numbers() {
        let request = PlanRequest::new(sample_assumptions()).with_objectives(vec![OptimizationObjective::PreserveRunway]);
        let plain = PlanningService::default().create_plan(&request).unwrap();
        let broken = PlanningService::default()
            .with_store(Box::new(BrokenStore))
            .with_narrator(Box::new(FixedNarrator(Err("timeout".to_string()))))
            .create_plan(&request)
            .unwrap();

        assert_eq!(broken.projection, plain.projection);
        assert_eq!(broken.summary, plain.summary);
        assert!(broken.narrative.is_none());
        assert!(broken.plan_id.is_none());
        assert!(broken.storage_error.as_deref().unwrap().contains("database offline"));
    }

    #[test]
    fn test_store_and_narrator_succeed() {
        let plan = PlanningService::default()
            .with_store(Box::new(InMemoryPlanStore::new()))
            .with_narrator(Box::new(FixedNarrator(Ok("steady growth".to_string()))))
            .create_plan(&PlanRequest::new(sample_assumptions()))
            .unwrap();

        assert_eq!(plan.narrative.as_deref(), Some("Seed plan: steady growth"));
        assert!(plan.plan_id.as_deref().unwrap().starts_with("seed-plan-"));
    }

    #[test]
    fn test_objectives_change_projection() {
        let service = PlanningService::default();
        let base = service.create_plan(&PlanRequest::new(sample_assumptions())).unwrap();
        let lean = service
            .create_plan(&PlanRequest::new(sample_assumptions()).with_objectives(vec![OptimizationObjective::PreserveRunway]))
            .unwrap();

        assert_eq!(base.baseline_summary, lean.baseline_summary);
        assert_eq!(lean.objectives, vec![OptimizationObjective::PreserveRunway]);
        assert_ne!(base.projection, lean.projection);
    }

    #[test]
    fn test_confirm_recommendation() {
        let mut assumptions = sample_assumptions();
        assumptions.cac_target = 60_000.0;
        let service = PlanningService::default();
        let plan = service
            .create_plan(&PlanRequest::new(assumptions).with_stage(CompanyStage::Seed))
            .unwrap();
        assert!(!plan.feasibility.benchmarks.is_empty());

        let pending = plan.pending_recommendations().next().cloned().unwrap();
        let updated = service.confirm_recommendation(&plan, &pending);

        assert_eq!(updated.recommendations.len(), plan.recommendations.len() - 1);
        let last = updated.projection.last().unwrap();
        assert_relative_eq!(updated.summary.ending_cash, last.cash_balance);
    }
}
