//! Error taxonomy for the risk engine

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the risk engine and its components
#[derive(Debug, Error)]
pub enum Error {
    /// The probe sequence found no free slot for a new profile
    #[error("card directory is full: no free slot within {0} probes")]
    DirectoryFull(usize),

    /// No account on file for the card number
    #[error("no account on file for card {0}")]
    UnknownCard(u64),

    /// An operation was invoked outside its input contract
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// Training needs at least one heuristic-flagged transaction
    #[error("insufficient training data: no flagged transactions in history")]
    InsufficientTrainingData,
}

impl Error {
    /// Shorthand for precondition failures
    pub fn precondition(msg: impl Into<String>) -> Self {
        Error::PreconditionViolated(msg.into())
    }
}
