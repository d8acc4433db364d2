use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// A planning assumption is outside its valid range
    #[error("Invalid planning assumption: {0}")]
    InvalidAssumption(String),

    /// A chart overlay parameter is outside its valid range
    #[error("Invalid overlay parameter: {0}")]
    InvalidOverlay(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
