//! Held-out dataset used by the batch and live features

use crate::error::DataUnavailableError;
use crate::types::transaction::{FeatureVector, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pre-encoded feature rows set aside from training.
#[derive(Debug, Clone)]
pub struct HoldoutSet {
    path: PathBuf,
    rows: Vec<FeatureVector>,
}

impl HoldoutSet {
    /// Load a CSV with a header row and one column per feature.
    ///
    /// Header names are not checked; rows must have exactly seven numeric
    /// columns in model order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataUnavailableError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataUnavailableError::Missing(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            rows.push(parse_row(&record, index + 1)?);
        }

        if rows.is_empty() {
            return Err(DataUnavailableError::Empty(path.to_path_buf()));
        }

        info!(path = %path.display(), rows = rows.len(), "Held-out dataset loaded");

        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Build from rows already in memory.
    pub fn from_rows(rows: Vec<FeatureVector>) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            rows,
        }
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_row(record: &csv::StringRecord, row: usize) -> Result<FeatureVector, DataUnavailableError> {
    if record.len() != FEATURE_COUNT {
        return Err(DataUnavailableError::Malformed {
            row,
            reason: format!("expected {} columns, found {}", FEATURE_COUNT, record.len()),
        });
    }

    let values = record
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| DataUnavailableError::Malformed {
                row,
                reason: format!("'{}' is not a number", field),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    FeatureVector::try_from(values).map_err(|len| DataUnavailableError::Malformed {
        row,
        reason: format!("expected {} columns, found {}", FEATURE_COUNT, len),
    })
}

/// Uniform row sampler, optionally seeded for reproducible runs.
pub struct RowSampler {
    rng: StdRng,
}

impl RowSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// One row, or `None` for an empty slice.
    pub fn pick_one(&mut self, rows: &[FeatureVector]) -> Option<FeatureVector> {
        rows.choose(&mut self.rng).copied()
    }

    /// Up to `count` distinct rows, drawn without replacement.
    pub fn pick_many(&mut self, rows: &[FeatureVector], count: usize) -> Vec<FeatureVector> {
        rows.choose_multiple(&mut self.rng, count).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn rows(n: usize) -> Vec<FeatureVector> {
        (0..n)
            .map(|i| FeatureVector::new([i as f64, 4.0, 100.0, 0.0, 0.0, 0.0, 0.0]))
            .collect()
    }

    #[test]
    fn test_load_valid_csv() {
        let file = write_csv(
            "0,1,2,3,4,5,6\n\
             -0.53, 1.2, 0.1, -0.2, -0.3, 0.0, 0.4\n\
             1,4,25000.5,30000,5000,1000,26000.5\n",
        );

        let holdout = HoldoutSet::load(file.path()).unwrap();
        assert_eq!(holdout.len(), 2);
        assert_eq!(
            holdout.rows()[1].values(),
            &[1.0, 4.0, 25000.5, 30000.0, 5000.0, 1000.0, 26000.5]
        );
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = HoldoutSet::load("/nonexistent/X_test.csv");
        assert!(matches!(result, Err(DataUnavailableError::Missing(_))));
    }

    #[test]
    fn test_header_only_is_empty() {
        let file = write_csv("step,type,amount,oldbalanceOrg,newbalanceOrig,oldbalanceDest,newbalanceDest\n");
        assert!(matches!(
            HoldoutSet::load(file.path()),
            Err(DataUnavailableError::Empty(_))
        ));
    }

    #[test]
    fn test_malformed_rows_rejected() {
        let file = write_csv("a,b,c,d,e,f,g\n1,2,3,4,5,6,x\n");
        assert!(matches!(
            HoldoutSet::load(file.path()),
            Err(DataUnavailableError::Malformed { row: 1, .. })
        ));

        let file = write_csv("a,b,c\n1,2,3\n");
        assert!(HoldoutSet::load(file.path()).is_err());
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let data = rows(50);
        let mut first = RowSampler::new(Some(7));
        let mut second = RowSampler::new(Some(7));

        assert_eq!(first.pick_many(&data, 5), second.pick_many(&data, 5));
        assert_eq!(first.pick_one(&data), second.pick_one(&data));
    }

    #[test]
    fn test_pick_many_without_replacement() {
        let data = rows(10);
        let mut sampler = RowSampler::new(None);

        let picked = sampler.pick_many(&data, 10);
        let mut steps: Vec<i64> = picked.iter().map(|r| r.values()[0] as i64).collect();
        steps.sort();
        assert_eq!(steps, (0..10).collect::<Vec<_>>());

        assert_eq!(sampler.pick_many(&data, 25).len(), 10);
        assert_eq!(sampler.pick_one(&[]), None);
    }
}
