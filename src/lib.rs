//! Fraud Detection Dashboard Library
//!
//! Classifies mobile-money transactions with an offline-trained ONNX model,
//! scores random held-out samples, simulates a live transaction feed and
//! sends WhatsApp alerts for confident fraud.

pub mod batch;
pub mod command;
pub mod config;
pub mod error;
pub mod feature_encoder;
pub mod holdout;
pub mod live_feed;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod predictor;
pub mod render;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use feature_encoder::FeatureEncoder;
pub use live_feed::LiveFeed;
pub use models::{Classifier, OnnxClassifier};
pub use notifier::{AlertNotifier, TwilioNotifier};
pub use predictor::Predictor;
pub use session::Dashboard;
pub use types::{FeatureVector, PredictionResult, TransactionInput, TransactionRecord};
