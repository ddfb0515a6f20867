//! Monthly projection engine for 12-month financial plans

mod state;
mod engine;
mod monthly;
mod series;

pub use state::ProjectionState;
pub use engine::{ProjectionEngine, ProjectionConfig};
pub use monthly::{CalculationWarning, MonthlyState, OpexBreakdown, Runway, INFINITE_RUNWAY_SENTINEL};
pub use series::{PlanSummary, ProjectionSeries, SeriesContext};
