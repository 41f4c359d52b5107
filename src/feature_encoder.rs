//! Feature encoding for fraud model inference.
//!
//! The classifier was trained on PaySim transactions with `type` label-encoded
//! and the identifying columns dropped. This module reproduces that layout.

use crate::error::EncodingError;
use crate::types::transaction::{FeatureVector, TransactionInput, TransactionRecord};

/// Encoder that transforms transactions into model input features.
///
/// Features are produced in the exact order expected by the ONNX model:
/// step, type code, amount, then sender and receiver balances.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Validate raw input and encode it.
    ///
    /// Fails with [`EncodingError`] when the type is not one of the five known
    /// names or a numeric field is out of range. No vector is produced then.
    pub fn encode(&self, input: &TransactionInput) -> Result<FeatureVector, EncodingError> {
        let record = TransactionRecord::try_from(input)?;
        Ok(self.encode_record(&record))
    }

    /// Encode an already validated record.
    pub fn encode_record(&self, record: &TransactionRecord) -> FeatureVector {
        record.encode()
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::TransactionType;

    #[test]
    fn test_example_transaction_encoding() {
        let encoder = FeatureEncoder::new();
        let features = encoder.encode(&TransactionInput::example()).unwrap();

        assert_eq!(
            features.values(),
            &[100.0, 4.0, 25000.50, 30000.00, 5000.00, 1000.00, 26000.50]
        );
    }

    #[test]
    fn test_every_type_gets_its_fixed_code() {
        let encoder = FeatureEncoder::new();
        let expected = [
            ("CASH-IN", 0.0),
            ("CASH-OUT", 1.0),
            ("DEBIT", 2.0),
            ("PAYMENT", 3.0),
            ("TRANSFER", 4.0),
        ];

        for (name, code) in expected {
            let input = TransactionInput {
                transaction_type: name.to_string(),
                ..TransactionInput::default()
            };
            let features = encoder.encode(&input).unwrap();
            assert_eq!(features.type_code(), code, "type {name}");
        }
        assert_eq!(TransactionType::ALL.len(), expected.len());
    }

    #[test]
    fn test_unknown_type_produces_no_vector() {
        let encoder = FeatureEncoder::new();
        let input = TransactionInput {
            transaction_type: "CRYPTO".to_string(),
            ..TransactionInput::default()
        };

        assert_eq!(
            encoder.encode(&input),
            Err(EncodingError::UnknownTransactionType("CRYPTO".to_string()))
        );
    }
}
