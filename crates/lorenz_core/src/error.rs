use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Rejected at construction: bad step size, missing seeds, or non-finite seed data.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A trajectory index or prefix length beyond what has been recorded.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Only produced when the engine was configured to halt on non-finite states.
    #[error("Integration halted: trajectory {trajectory} became non-finite at step {step}.")]
    Halted { trajectory: usize, step: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;
