//! Error types for the planning engine

/// Errors raised while building or loading plan inputs
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid assumption `{field}`: {reason}")]
    InvalidAssumption { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PlanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PlanError::InvalidAssumption {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by a single scenario simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ScenarioError {
    #[error("Scenario duration must be between 1 and {max} months, got {months}")]
    InvalidDuration { months: u32, max: u32 },

    #[error("Scenario parameter `{parameter}` resolved to an invalid value {value}")]
    InvalidParameter { parameter: String, value: f64 },

    #[error("Scenario baseline is invalid: {0}")]
    InvalidBaseline(String),
}

/// Errors raised by a plan store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Plan `{0}` not found")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Plan store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a narrative provider
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("Narrative provider unavailable: {0}")]
    Unavailable(String),

    #[error("Narrative provider failed: {0}")]
    Failed(String),
}
