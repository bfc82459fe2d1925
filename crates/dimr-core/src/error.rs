//! Error types for the quantity engine

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CalcError>;

/// The two failure kinds the engine distinguishes.
///
/// `InvalidArgument` means the caller handed us structurally bad input
/// (an unregistered unit, a non-numeric string). `InvalidOperation` means
/// the computation itself is undefined for the operands (dimension
/// mismatch, odd-exponent root, division by zero). Neither is ever
/// recovered from internally; both surface synchronously to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl CalcError {
    /// Build an `InvalidArgument` from anything stringy.
    pub fn argument(msg: impl Into<String>) -> Self {
        CalcError::InvalidArgument(msg.into())
    }

    /// Build an `InvalidOperation` from anything stringy.
    pub fn operation(msg: impl Into<String>) -> Self {
        CalcError::InvalidOperation(msg.into())
    }
}
