//! Session statistics for the fraud dashboard.

use crate::batch::BatchReport;
use crate::predictor::Evaluation;
use crate::types::alert::AlertOutcome;
use std::time::{Duration, Instant};
use tracing::info;

/// Counters for one interactive session.
///
/// Owned by the session and only touched from its task, so plain integers
/// are enough.
#[derive(Debug)]
pub struct SessionStats {
    /// Single predictions (manual and live)
    pub predictions: u64,
    /// Single predictions labelled fraudulent
    pub fraudulent: u64,
    /// Alerts delivered
    pub alerts_sent: u64,
    /// Alerts that failed to deliver
    pub alerts_failed: u64,
    /// Classifier failures
    pub classifier_errors: u64,
    /// Live feed iterations executed
    pub live_iterations: u64,
    /// Batch runs and rows scored by them
    pub batch_runs: u64,
    pub batch_rows: u64,
    pub batch_fraud: u64,
    /// Probability distribution buckets of single predictions
    score_buckets: [u64; 10],
    /// Session start
    start_time: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            predictions: 0,
            fraudulent: 0,
            alerts_sent: 0,
            alerts_failed: 0,
            classifier_errors: 0,
            live_iterations: 0,
            batch_runs: 0,
            batch_rows: 0,
            batch_fraud: 0,
            score_buckets: [0; 10],
            start_time: Instant::now(),
        }
    }

    /// Record a single-transaction evaluation
    pub fn record_evaluation(&mut self, evaluation: &Evaluation) {
        self.predictions += 1;
        if evaluation.result.label.is_fraud() {
            self.fraudulent += 1;
        }

        match evaluation.alert {
            AlertOutcome::Sent { .. } => self.alerts_sent += 1,
            AlertOutcome::Failed { .. } => self.alerts_failed += 1,
            AlertOutcome::NotTriggered => {}
        }

        let bucket = (evaluation.result.probability * 10.0).clamp(0.0, 9.0) as usize;
        self.score_buckets[bucket] += 1;
    }

    pub fn record_classifier_error(&mut self) {
        self.classifier_errors += 1;
    }

    pub fn record_live_iteration(&mut self) {
        self.live_iterations += 1;
    }

    pub fn record_batch(&mut self, report: &BatchReport) {
        self.batch_runs += 1;
        self.batch_rows += report.rows.len() as u64;
        self.batch_fraud += report.fraud_count as u64;
    }

    /// Get score distribution
    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let fraud_rate = if self.predictions > 0 {
            (self.fraudulent as f64 / self.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            FRAUD DETECTION DASHBOARD - SESSION SUMMARY       ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Predictions: {:>8}  │  Fraudulent: {:>6} ({:>5.1}%)         ║",
            self.predictions, self.fraudulent, fraud_rate
        );
        info!(
            "║ Alerts sent: {:>8}  │  Alerts failed: {:>6}                ║",
            self.alerts_sent, self.alerts_failed
        );
        info!(
            "║ Live iterations: {:>4}  │  Classifier errors: {:>6}            ║",
            self.live_iterations, self.classifier_errors
        );
        info!(
            "║ Batch runs: {:>9}  │  Rows: {:>6}  │  Fraud: {:>6}        ║",
            self.batch_runs, self.batch_rows, self.batch_fraud
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        let total: u64 = self.score_buckets.iter().sum();
        for (i, &count) in self.score_buckets.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 5.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!(
            "╚═══════════════════════════════════════ session {:>6}s ═══════╝",
            self.elapsed().as_secs()
        );
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
