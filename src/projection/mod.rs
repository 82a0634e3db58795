//! Monthly simulation engine for the business plan

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::{
    default_start_date, simulate, AcquisitionPolicy, MonthZero, ProjectionConfig, ProjectionEngine,
};
pub use records::{percentage_of, MonthlyRecord, ProjectionResult, ProjectionSummary, YearSummary};
