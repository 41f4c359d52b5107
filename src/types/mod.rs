//! Type definitions for the fraud dashboard

pub mod alert;
pub mod transaction;

pub use alert::{AlertOutcome, Label, PredictionResult};
pub use transaction::{
    FeatureVector, TransactionInput, TransactionRecord, TransactionType, FEATURE_COUNT,
    FEATURE_NAMES,
};
