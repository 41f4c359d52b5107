//! Single-transaction prediction and alert decision

use crate::error::ClassifierError;
use crate::models::classifier::{expect_len, Classifier};
use crate::notifier::AlertNotifier;
use crate::types::alert::{AlertOutcome, Label, PredictionResult};
use crate::types::transaction::FeatureVector;
use serde::Serialize;
use tracing::{info, warn};

/// Default fraud probability above which an alert is sent.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.90;

/// Whether a prediction warrants an outbound alert.
///
/// Only fraudulent verdicts with probability strictly above `threshold` alert.
pub fn should_alert(label: Label, probability: f64, threshold: f64) -> bool {
    label.is_fraud() && probability > threshold
}

/// Prediction plus what happened to its alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub result: PredictionResult,
    pub alert: AlertOutcome,
}

/// Classify one row through the classifier's batch interface.
pub fn classify<C: Classifier + ?Sized>(
    classifier: &C,
    features: &FeatureVector,
) -> Result<PredictionResult, ClassifierError> {
    let rows = std::slice::from_ref(features);
    let labels = expect_len(classifier.predict(rows)?, 1)?;
    let probabilities = expect_len(classifier.predict_probability(rows)?, 1)?;

    let probability = probabilities[0];
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::InvalidProbability(probability));
    }

    Ok(PredictionResult {
        label: Label::from_raw(labels[0]),
        probability,
    })
}

/// Scores single transactions and sends alerts for confident fraud.
pub struct Predictor<C, N> {
    classifier: C,
    notifier: N,
    alert_threshold: f64,
}

impl<C: Classifier, N: AlertNotifier> Predictor<C, N> {
    pub fn new(classifier: C, notifier: N, alert_threshold: f64) -> Self {
        Self {
            classifier,
            notifier,
            alert_threshold,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Classify one transaction and alert if warranted.
    ///
    /// Classifier failures are returned as-is. Notifier failures are logged
    /// and reported in [`Evaluation::alert`] without touching the result.
    pub async fn evaluate(&self, features: &FeatureVector) -> Result<Evaluation, ClassifierError> {
        let result = classify(&self.classifier, features)?;

        if !should_alert(result.label, result.probability, self.alert_threshold) {
            return Ok(Evaluation {
                result,
                alert: AlertOutcome::NotTriggered,
            });
        }

        let alert = match self.notifier.send(result.probability).await {
            Ok(message_id) => {
                info!(
                    message_id = %message_id,
                    probability = result.probability,
                    "Fraud alert sent"
                );
                AlertOutcome::Sent { message_id }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    probability = result.probability,
                    "Fraud alert could not be sent"
                );
                AlertOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(Evaluation { result, alert })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::testing::{FailingNotifier, RecordingNotifier, ScriptedClassifier};

    fn row() -> FeatureVector {
        FeatureVector::new([100.0, 4.0, 25000.5, 30000.0, 5000.0, 1000.0, 26000.5])
    }

    #[test]
    fn test_alert_decision_boundary() {
        assert!(!should_alert(Label::Fraudulent, 0.90, DEFAULT_ALERT_THRESHOLD));
        assert!(should_alert(Label::Fraudulent, 0.900001, DEFAULT_ALERT_THRESHOLD));
        assert!(should_alert(Label::Fraudulent, 1.0, DEFAULT_ALERT_THRESHOLD));
        assert!(!should_alert(Label::Legitimate, 0.99, DEFAULT_ALERT_THRESHOLD));
    }

    #[test]
    fn test_label_follows_raw_output() {
        let fraud = ScriptedClassifier::constant(1, 0.3);
        assert_eq!(classify(&fraud, &row()).unwrap().label, Label::Fraudulent);

        let legit = ScriptedClassifier::constant(0, 0.95);
        let result = classify(&legit, &row()).unwrap();
        assert_eq!(result.label, Label::Legitimate);
        assert_eq!(result.probability, 0.95);
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let classifier = ScriptedClassifier::constant(1, 1.5);
        assert_eq!(
            classify(&classifier, &row()),
            Err(ClassifierError::InvalidProbability(1.5))
        );

        let classifier = ScriptedClassifier::constant(1, f64::NAN);
        assert!(classify(&classifier, &row()).is_err());
    }

    #[test]
    fn test_classifier_failure_surfaces() {
        let classifier = ScriptedClassifier::failing("session closed");
        assert_eq!(
            classify(&classifier, &row()),
            Err(ClassifierError::Inference("session closed".to_string()))
        );
    }

    #[tokio::test]
    async fn test_alert_sent_above_threshold() {
        let predictor = Predictor::new(
            ScriptedClassifier::constant(1, 0.900001),
            RecordingNotifier::default(),
            DEFAULT_ALERT_THRESHOLD,
        );

        let evaluation = predictor.evaluate(&row()).await.unwrap();
        assert_eq!(evaluation.result.label, Label::Fraudulent);
        assert!(matches!(evaluation.alert, AlertOutcome::Sent { .. }));
        assert_eq!(predictor.notifier().sent(), vec![0.900001]);
    }

    #[tokio::test]
    async fn test_no_alert_at_threshold() {
        let predictor = Predictor::new(
            ScriptedClassifier::constant(1, 0.90),
            RecordingNotifier::default(),
            DEFAULT_ALERT_THRESHOLD,
        );

        let evaluation = predictor.evaluate(&row()).await.unwrap();
        assert_eq!(evaluation.alert, AlertOutcome::NotTriggered);
        assert!(predictor.notifier().sent().is_empty());
    }

    #[tokio::test]
    async fn test_notifier_failure_keeps_prediction() {
        let predictor = Predictor::new(
            ScriptedClassifier::constant(1, 0.97),
            FailingNotifier(NotificationError::Transport("connection reset".to_string())),
            DEFAULT_ALERT_THRESHOLD,
        );

        let evaluation = predictor.evaluate(&row()).await.unwrap();
        assert_eq!(
            evaluation.result,
            PredictionResult {
                label: Label::Fraudulent,
                probability: 0.97
            }
        );
        assert!(matches!(
            evaluation.alert,
            AlertOutcome::Failed { ref reason } if reason.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn test_classifier_failure_sends_nothing() {
        let predictor = Predictor::new(
            ScriptedClassifier::failing("boom"),
            RecordingNotifier::default(),
            DEFAULT_ALERT_THRESHOLD,
        );

        assert!(predictor.evaluate(&row()).await.is_err());
        assert!(predictor.notifier().sent().is_empty());
    }
}
