//! Unified error type for the field ledger.
//!
//! Every command and query reports failures through [`Error`]. Nothing is retried and
//! nothing here is fatal: callers surface the message and keep their previous state.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing input (empty name, negative quantity, missing spraying chemical, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A spraying operation needs more of a chemical than the warehouse holds
    #[error("Not enough {name} in stock: required {required} L, available {available} L")]
    InsufficientStock {
        /// Chemical name
        name: String,
        /// Liters the operation would consume
        required: f64,
        /// Liters currently in stock
        available: f64,
    },

    /// A referenced row does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row that was looked up ("field", "chemical", ...)
        entity: &'static str,
        /// Id that was looked up
        id: i64,
    },

    /// The underlying store rejected or failed a call
    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),

    /// Seed configuration could not be read or resolved
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects NaN, infinities and negative values for an optional measurement.
pub(crate) fn ensure_non_negative(label: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::validation(format!(
            "{label} must be a non-negative number, got {v}"
        ))),
        _ => Ok(()),
    }
}
