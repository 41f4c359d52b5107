//! Random batch scoring over the held-out dataset

use crate::error::ClassifierError;
use crate::holdout::{HoldoutSet, RowSampler};
use crate::models::classifier::{expect_len, Classifier};
use crate::types::alert::Label;
use crate::types::transaction::FeatureVector;
use serde::Serialize;
use tracing::{debug, warn};

/// Rows scored by one batch run.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// One sampled row with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub features: FeatureVector,
    pub label: Label,
    /// Fraud probability rounded to 6 decimals
    pub probability: f64,
}

/// Result of scoring a random sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub rows: Vec<ScoredRow>,
    pub fraud_count: usize,
}

/// Batch run outcome. A missing dataset is a status, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Unavailable,
    Scored(BatchReport),
}

/// Round to 6 decimal places for display.
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Draws a random sample from the held-out set and scores it in one call.
///
/// No alerts are sent from here; batch output is for inspection only.
pub struct BatchSampler {
    sample_size: usize,
}

impl BatchSampler {
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size }
    }

    pub fn run<C: Classifier + ?Sized>(
        &self,
        classifier: &C,
        holdout: Option<&HoldoutSet>,
        sampler: &mut RowSampler,
    ) -> Result<BatchOutcome, ClassifierError> {
        let Some(holdout) = holdout.filter(|set| !set.is_empty()) else {
            return Ok(BatchOutcome::Unavailable);
        };

        if holdout.len() < self.sample_size {
            warn!(
                available = holdout.len(),
                requested = self.sample_size,
                "Held-out dataset smaller than batch size, scoring every row"
            );
        }

        let sample = sampler.pick_many(holdout.rows(), self.sample_size);
        let report = score_rows(classifier, sample)?;

        debug!(
            rows = report.rows.len(),
            fraud_count = report.fraud_count,
            "Batch scored"
        );

        Ok(BatchOutcome::Scored(report))
    }
}

impl Default for BatchSampler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

/// Score all rows with one `predict` and one `predict_probability` call.
pub fn score_rows<C: Classifier + ?Sized>(
    classifier: &C,
    rows: Vec<FeatureVector>,
) -> Result<BatchReport, ClassifierError> {
    let labels = expect_len(classifier.predict(&rows)?, rows.len())?;
    let probabilities = expect_len(classifier.predict_probability(&rows)?, rows.len())?;

    if let Some(&bad) = probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ClassifierError::InvalidProbability(bad));
    }

    let scored: Vec<ScoredRow> = rows
        .into_iter()
        .zip(labels)
        .zip(probabilities)
        .map(|((features, raw), probability)| ScoredRow {
            features,
            label: Label::from_raw(raw),
            probability: round6(probability),
        })
        .collect();

    let fraud_count = scored.iter().filter(|r| r.label.is_fraud()).count();

    Ok(BatchReport {
        rows: scored,
        fraud_count,
    })
}
