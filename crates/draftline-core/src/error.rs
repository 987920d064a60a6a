// Error taxonomy for draft requests.

use thiserror::Error;

/// Failures that abort a single draft request. Role infeasibility is not
/// here: the solver reports it as an ordinary value.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft already finished ({steps} actions committed)")]
    DraftCompleted { steps: usize },

    #[error("scoring oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("malformed draft state: {0}")]
    MalformedState(String),

    #[error("illegal action at step {step}: {message}")]
    IllegalAction { step: usize, message: String },
}

/// Errors raised by a scoring oracle implementation.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle has no usable data: {0}")]
    Unavailable(String),

    #[error("oracle returned {got} scores, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

impl From<OracleError> for DraftError {
    fn from(err: OracleError) -> Self {
        DraftError::OracleUnavailable(err.to_string())
    }
}

/// Errors raised while loading reference data (roles, pair stats, priors).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}
