//! Fitness Appraisal - monthly projection and investment appraisal for a fitness business
//!
//! This library provides:
//! - Reducing-balance depreciation of the capital investment list
//! - EMI loan amortization
//! - A deterministic monthly simulation of membership, P&L and cash flow
//! - NPV, IRR, MIRR and payback metrics over the resulting cash flows

pub mod error;
pub mod assumptions;
pub mod capital;
pub mod projection;
pub mod valuation;

// Re-export commonly used types
pub use error::{AppraisalError, ValuationError};
pub use assumptions::{Assumptions, ExpenseItem, InvestmentItem, LoanTerms, PlanInputs};
pub use capital::{depreciation_for_year, depreciation_schedule, AssetDepreciation, LoanSchedule};
pub use projection::{simulate, MonthlyRecord, ProjectionConfig, ProjectionEngine, ProjectionResult};
pub use valuation::{valuation_metrics, ValuationMetrics};
