//! Error types for simulation, comparison and configuration loading

use thiserror::Error;

/// Errors surfaced by the simulator, the comparator and the config layer
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A parameter failed validation before any month was simulated
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: String,
    },

    /// The wrapped scenario ended at exactly zero, so the ratio is undefined
    #[error("degenerate comparison: final worth of scenario B is {worth_b}, ratio undefined")]
    DegenerateComparison { worth_b: f64 },

    /// Configuration content was readable but unusable
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
