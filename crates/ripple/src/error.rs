//! Error types for the wave engine

use thiserror::Error;

/// Errors raised synchronously by field construction and impulse injection.
///
/// The background motion loop never produces one of these: a configuration
/// that would be invalid is rejected before a run can start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Impulse index is not a valid node index
    #[error("node index {index} is out of range for a field of {len} nodes")]
    OutOfRange { index: usize, len: usize },

    /// A parameter is outside the range the engine accepts
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SimulationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
