//! Error types for the simulator

use thiserror::Error;

/// Result alias used throughout the crate
pub type LmnpResult<T> = Result<T, LmnpError>;

#[derive(Debug, Error)]
pub enum LmnpError {
    /// A parameter failed validation. Nothing is built from it.
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// A metric was requested before any simulation was submitted
    #[error("No simulation available: {0}")]
    MissingPrerequisite(String),

    #[error("{function} did not converge after {iterations} iterations")]
    NoConvergence { function: String, iterations: u32 },

    #[error("Cannot parse value {value:?} for key {key}")]
    ParseValue { key: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LmnpError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LmnpError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Reject negative or non-finite amounts
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> LmnpResult<()> {
    if !value.is_finite() {
        return Err(LmnpError::invalid(field, format!("must be finite, got {}", value)));
    }
    if value < 0.0 {
        return Err(LmnpError::invalid(field, format!("must be >= 0, got {}", value)));
    }
    Ok(())
}
