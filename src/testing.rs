//! Test doubles for the classifier and notifier

use crate::error::{ClassifierError, NotificationError};
use crate::models::classifier::Classifier;
use crate::notifier::AlertNotifier;
use crate::types::transaction::FeatureVector;
use std::sync::Mutex;

/// Classifier whose output is a function of the input row.
pub struct ScriptedClassifier {
    score: Box<dyn Fn(&FeatureVector) -> (i64, f64) + Send + Sync>,
    error: Option<String>,
    calls: Mutex<usize>,
}

impl ScriptedClassifier {
    pub fn new(score: impl Fn(&FeatureVector) -> (i64, f64) + Send + Sync + 'static) -> Self {
        Self {
            score: Box::new(score),
            error: None,
            calls: Mutex::new(0),
        }
    }

    /// Same label and probability for every row.
    pub fn constant(label: i64, probability: f64) -> Self {
        Self::new(move |_| (label, probability))
    }

    /// Rows whose type code is TRANSFER (4) are fraud with probability 0.95.
    pub fn transfers_are_fraud() -> Self {
        Self::new(|row| {
            if row.type_code() == 4.0 {
                (1, 0.95)
            } else {
                (0, 0.02)
            }
        })
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::constant(0, 0.0)
        }
    }

    /// Number of classifier calls made so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn record(&self) -> Result<(), ClassifierError> {
        *self.calls.lock().unwrap() += 1;
        match &self.error {
            Some(message) => Err(ClassifierError::Inference(message.clone())),
            None => Ok(()),
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        self.record()?;
        Ok(rows.iter().map(|r| (self.score)(r).0).collect())
    }

    fn predict_probability(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError> {
        self.record()?;
        Ok(rows.iter().map(|r| (self.score)(r).1).collect())
    }
}

/// Notifier that records every probability it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<f64>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<f64> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    async fn send(&self, probability: f64) -> Result<String, NotificationError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(probability);
        Ok(format!("SM{:04}", sent.len()))
    }
}

/// Notifier that always fails with the given error.
pub struct FailingNotifier(pub NotificationError);

impl AlertNotifier for FailingNotifier {
    async fn send(&self, _probability: f64) -> Result<String, NotificationError> {
        Err(self.0.clone())
    }
}
