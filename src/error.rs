use thiserror::Error;
use validator::ValidationErrors;

/// Failure reported by a [`SolverEngine`](crate::optimizer::SolverEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("problem is infeasible")]
    Infeasible,
    #[error("problem is unbounded")]
    Unbounded,
}

impl From<minilp::Error> for SolverError {
    fn from(error: minilp::Error) -> Self {
        match error {
            minilp::Error::Infeasible => SolverError::Infeasible,
            minilp::Error::Unbounded => SolverError::Unbounded,
        }
    }
}

/// Errors surfaced by horizon construction and dispatch.
///
/// None of these are recovered from internally: a dispatch decision has real
/// monetary and physical consequences, so the caller decides what to fall
/// back to.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid hardware model: {0}")]
    InvalidHardwareModel(ValidationErrors),

    #[error("Invalid horizon parameters: {0}")]
    InvalidParameters(ValidationErrors),

    #[error("Forecast is empty")]
    EmptyForecast,

    #[error("Invalid forecast at period {period}: {reason}")]
    InvalidForecast { period: usize, reason: &'static str },

    #[error("Arbitrage violation at period {period}: buy {price_buy} < sell {price_sell}")]
    ArbitrageViolation {
        period: usize,
        price_buy: f64,
        price_sell: f64,
    },

    #[error("State of charge out of bounds: {0}")]
    InvalidStateOfCharge(f64),

    #[error("Solver failed: {0}")]
    SolveFailure(#[from] SolverError),
}
