//! Error types for plan loading and valuation solvers

use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading or validating a business plan
#[derive(Debug, Error)]
pub enum AppraisalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl AppraisalError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppraisalError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Why a valuation metric could not be produced.
///
/// A metric carrying one of these is "undefined", never a valid zero.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationError {
    /// Undefined ratio or violated precondition (no sign change, zero PV/FV, ...)
    #[error("Degenerate input: {context}")]
    DegenerateInput { context: String },

    /// Root finder failed to bracket or converge
    #[error("{function} did not converge after {iterations} iterations (last NPV: {last_npv})")]
    NonConvergence {
        function: String,
        iterations: u32,
        last_npv: f64,
    },
}

pub type AppraisalResult<T> = Result<T, AppraisalError>;
pub type ValuationResult<T> = Result<T, ValuationError>;
