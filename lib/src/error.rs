//! Error types for field analysis operations

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by the analysis routines
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Mutually exclusive options supplied together, or an invalid parameter
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required axis is not present on the field
    #[error("missing axis '{axis}' (field has axes {available:?})")]
    MissingAxis { axis: String, available: Vec<String> },

    /// Input data does not satisfy the operation's preconditions
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Error reported by the FFT backend
    #[error("FFT error: {0}")]
    Fft(String),
}

impl AnalysisError {
    /// True for errors caused by the shape or content of the input field
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingAxis { .. } | AnalysisError::InvalidInput(_)
        )
    }

    /// True for errors caused by the options passed to an operation
    pub fn is_configuration(&self) -> bool {
        matches!(self, AnalysisError::Configuration(_))
    }
}
