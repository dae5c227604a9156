//! Error types for polychaos

use thiserror::Error;

/// Polychaos error type
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Two operands share an underlying source of randomness, invalidating
    /// an algebraic shortcut that assumes independence.
    #[error("Stochastically dependent operands: {0}")]
    StochasticallyDependent(String),

    /// Not implemented
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
