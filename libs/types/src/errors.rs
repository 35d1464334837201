//! Error types for shared numeric primitives

use thiserror::Error;

/// Errors raised when constructing numeric types from raw values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("Exchange rate must be greater than zero")]
    ZeroRate,
}
