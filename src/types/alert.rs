//! Prediction and alert data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifier verdict for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Fraudulent,
}

impl Label {
    /// Map the model's raw class output. Only class 1 is fraud.
    pub fn from_raw(raw: i64) -> Self {
        if raw == 1 {
            Label::Fraudulent
        } else {
            Label::Legitimate
        }
    }

    pub fn is_fraud(self) -> bool {
        self == Label::Fraudulent
    }

    /// Numeric form used in tables (`0` legitimate, `1` fraudulent)
    pub fn as_raw(self) -> u8 {
        match self {
            Label::Legitimate => 0,
            Label::Fraudulent => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => f.write_str("legitimate"),
            Label::Fraudulent => f.write_str("fraudulent"),
        }
    }
}

/// Classifier output for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    /// Fraud-class probability (0.0 - 1.0)
    pub probability: f64,
}

/// What happened to the alert for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// Below threshold or not fraudulent
    NotTriggered,
    /// Delivered to the messaging provider
    Sent { message_id: String },
    /// Delivery failed; the prediction still stands
    Failed { reason: String },
}

/// Body of the outbound alert message.
pub fn alert_message(probability: f64) -> String {
    format!(
        "🚨 Fraud Alert: Transaction flagged with {:.2}% probability!",
        probability * 100.0
    )
}
