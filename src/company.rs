//! Company profile: the current position scenarios start from

use crate::benchmarks::{CompanyStage, StageBenchmarks};
use serde::{Deserialize, Serialize};

/// Snapshot of a company's current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub stage: CompanyStage,
    pub mrr: f64,
    pub customers: f64,
    pub price_per_customer: f64,
    pub team_size: u32,
    pub cash_balance: f64,

    /// Latest actual monthly burn, if known
    #[serde(default)]
    pub monthly_burn: Option<f64>,

    /// Latest actual runway in months, if known
    #[serde(default)]
    pub runway_months: Option<f64>,
}

impl CompanyProfile {
    pub fn new(name: impl Into<String>, stage: CompanyStage) -> Self {
        Self {
            name: name.into(),
            stage,
            mrr: 0.0,
            customers: 0.0,
            price_per_customer: 100.0,
            team_size: 1,
            cash_balance: 0.0,
            monthly_burn: None,
            runway_months: None,
        }
    }

    /// Benchmark table for the company's stage
    pub fn benchmarks(&self) -> StageBenchmarks {
        StageBenchmarks::for_stage(self.stage)
    }
}
