//! Injected collaborators: plan persistence and narrative annotation
//!
//! The engine never depends on these succeeding. The planner calls them after all
//! computation is done and records failures on the plan instead of aborting.

use crate::error::{NarrativeError, StoreError};
use crate::planner::FinancialPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default directory for [`JsonFilePlanStore`]
pub const DEFAULT_PLAN_DIR: &str = "plans";

/// A persisted plan with its storage metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub plan: FinancialPlan,
}

/// Persistence for generated plans
pub trait PlanStore: Send + Sync {
    /// Persist a plan and return its id
    fn save(&self, plan: &FinancialPlan) -> Result<String, StoreError>;

    fn load(&self, id: &str) -> Result<StoredPlan, StoreError>;

    /// Ids of every stored plan
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Optional narrative annotation for a finished plan
pub trait Narrator: Send + Sync {
    fn narrate(&self, plan: &FinancialPlan) -> Result<String, NarrativeError>;
}

/// Build a plan id from its name and save time
pub fn plan_id(name: &str, saved_at: DateTime<Utc>) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "plan" } else { slug };
    format!("{}-{}", slug, saved_at.format("%Y%m%d%H%M%S%3f"))
}

/// Process-local store, mostly for tests and one-shot CLI runs
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: Mutex<BTreeMap<String, StoredPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plans.lock().map(|plans| plans.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlanStore for InMemoryPlanStore {
    fn save(&self, plan: &FinancialPlan) -> Result<String, StoreError> {
        let saved_at = Utc::now();
        let mut plans = self
            .plans
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        let mut id = plan_id(&plan.plan_name, saved_at);
        let base = id.clone();
        let mut n = 1;
        while plans.contains_key(&id) {
            n += 1;
            id = format!("{}-{}", base, n);
        }

        plans.insert(
            id.clone(),
            StoredPlan {
                id: id.clone(),
                saved_at,
                plan: plan.clone(),
            },
        );
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<StoredPlan, StoreError> {
        let plans = self
            .plans
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        plans.get(id).cloned().ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let plans = self
            .plans
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(plans.keys().cloned().collect())
    }
}

/// One JSON file per plan in a directory
#[derive(Debug, Clone)]
pub struct JsonFilePlanStore {
    dir: PathBuf,
}

impl JsonFilePlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl Default for JsonFilePlanStore {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_DIR)
    }
}

impl PlanStore for JsonFilePlanStore {
    fn save(&self, plan: &FinancialPlan) -> Result<String, StoreError> {
        fs::create_dir_all(&self.dir)?;

        let saved_at = Utc::now();
        let id = plan_id(&plan.plan_name, saved_at);
        let stored = StoredPlan {
            id: id.clone(),
            saved_at,
            plan: plan.clone(),
        };

        let file = File::create(self.path_for(&id))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &stored)?;
        log::debug!("Saved plan {} to {}", id, self.dir.display());
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<StoredPlan, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::test_support::sample_plan;
    use chrono::TimeZone;

    #[test]
    fn test_plan_id_slug() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(plan_id("Seed Plan 2026!", at), "seed-plan-2026-20260301123000000");
        assert_eq!(plan_id("???", at), "plan-20260301123000000");
    }

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryPlanStore::new();
        let plan = sample_plan();

        let first = store.save(&plan).unwrap();
        let second = store.save(&plan).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);

        let loaded = store.load(&first).unwrap();
        assert_eq!(loaded.plan.plan_name, plan.plan_name);
        assert_eq!(loaded.plan.projection.months.len(), 12);
        assert!(matches!(store.load("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("runway_planner_store_{}", std::process::id()));
        let store = JsonFilePlanStore::new(&dir);
        let plan = sample_plan();

        let id = store.save(&plan).unwrap();
        assert!(store.list().unwrap().contains(&id));

        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.plan.summary.total_months, 12);
        assert!(matches!(store.load("missing"), Err(StoreError::NotFound(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let store = JsonFilePlanStore::new(std::env::temp_dir().join("runway_planner_no_such_dir"));
        assert!(store.list().unwrap().is_empty());
    }
}
