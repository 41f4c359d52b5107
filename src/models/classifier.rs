//! Classifier interface consumed by the predictor, batch sampler and live feed

use crate::error::ClassifierError;
use crate::types::transaction::FeatureVector;

/// Binary fraud classifier trained offline.
///
/// Both calls take a batch of rows and return one value per row, in order.
/// Calls are synchronous and are never retried by the caller.
pub trait Classifier {
    /// Raw predicted class per row (`1` = fraud).
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ClassifierError>;

    /// Probability of class `1` per row.
    fn predict_probability(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        (**self).predict(rows)
    }

    fn predict_probability(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError> {
        (**self).predict_probability(rows)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        (**self).predict(rows)
    }

    fn predict_probability(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError> {
        (**self).predict_probability(rows)
    }
}

/// Check a classifier response has one entry per input row.
pub(crate) fn expect_len<T>(values: Vec<T>, expected: usize) -> Result<Vec<T>, ClassifierError> {
    if values.len() == expected {
        Ok(values)
    } else {
        Err(ClassifierError::OutputMismatch {
            expected,
            actual: values.len(),
        })
    }
}
