//! Error taxonomy for the dashboard.
//!
//! None of these errors is retried. Encoding and classifier errors abort the
//! prediction they belong to, a missing held-out dataset disables the batch
//! and live features, and notification errors are downgraded to warnings.

use std::path::PathBuf;
use thiserror::Error;

/// A transaction could not be turned into a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("unrecognized transaction type '{0}' (expected CASH-IN, CASH-OUT, DEBIT, PAYMENT or TRANSFER)")]
    UnknownTransactionType(String),

    #[error("step {0} is outside the simulated range 1..=744")]
    StepOutOfRange(i64),

    #[error("{field} must be a non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Model inference failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model returned {actual} outputs for {expected} rows")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("model returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),
}

/// The held-out dataset cannot be used.
#[derive(Debug, Error)]
pub enum DataUnavailableError {
    #[error("held-out dataset not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read held-out dataset: {0}")]
    Read(#[from] csv::Error),

    #[error("held-out row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("held-out dataset at {} has no rows", .0.display())]
    Empty(PathBuf),
}

/// The alert channel failed. Always non-fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotificationError {
    #[error("messaging credentials not configured (missing {0})")]
    MissingCredentials(&'static str),

    #[error("messaging request failed: {0}")]
    Transport(String),

    #[error("messaging provider rejected the alert with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A dashboard command line could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },

    #[error("unknown field '{0}' (expected step, type, amount, old_orig, new_orig, old_dest, new_dest)")]
    UnknownField(String),

    #[error("predict takes either key=value pairs or exactly 7 positional values, got {0}")]
    PositionalArity(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = EncodingError::UnknownTransactionType("WIRE".to_string());
        assert!(err.to_string().contains("'WIRE'"));

        let err = NotificationError::Rejected {
            status: 401,
            message: "Authenticate".to_string(),
        };
        assert!(err.to_string().contains("401"));
    }
}
