//! Transaction data structures for mobile-money fraud detection

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First and last simulated hour in the training data.
pub const STEP_RANGE: std::ops::RangeInclusive<i64> = 1..=744;

/// Kind of mobile-money transfer.
///
/// The discriminants are the label encoding the classifier was trained with
/// and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "CASH-IN")]
    CashIn = 0,
    #[serde(rename = "CASH-OUT")]
    CashOut = 1,
    #[serde(rename = "DEBIT")]
    Debit = 2,
    #[serde(rename = "PAYMENT")]
    Payment = 3,
    #[serde(rename = "TRANSFER")]
    Transfer = 4,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::CashIn,
        TransactionType::CashOut,
        TransactionType::Debit,
        TransactionType::Payment,
        TransactionType::Transfer,
    ];

    /// Integer code fed to the model
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::CashIn => "CASH-IN",
            TransactionType::CashOut => "CASH-OUT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == name)
            .ok_or_else(|| EncodingError::UnknownTransactionType(name.to_string()))
    }
}

/// Raw transaction as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Hour of the simulation (1-744)
    pub step: i64,

    /// Transaction type name
    #[serde(rename = "type")]
    pub transaction_type: String,

    /// Transferred amount
    pub amount: f64,

    /// Sender balance before the transaction
    #[serde(alias = "oldbalanceOrg")]
    pub old_balance_orig: f64,

    /// Sender balance after the transaction
    #[serde(alias = "newbalanceOrig")]
    pub new_balance_orig: f64,

    /// Receiver balance before the transaction
    #[serde(alias = "oldbalanceDest")]
    pub old_balance_dest: f64,

    /// Receiver balance after the transaction
    #[serde(alias = "newbalanceDest")]
    pub new_balance_dest: f64,
}

impl TransactionInput {
    /// The example transaction shown at the top of the dashboard.
    pub fn example() -> Self {
        Self {
            step: 100,
            transaction_type: TransactionType::Transfer.to_string(),
            amount: 25000.50,
            old_balance_orig: 30000.00,
            new_balance_orig: 5000.00,
            old_balance_dest: 1000.00,
            new_balance_dest: 26000.50,
        }
    }
}

impl Default for TransactionInput {
    /// Starting values of the manual entry form.
    fn default() -> Self {
        Self {
            step: 100,
            transaction_type: TransactionType::CashIn.to_string(),
            amount: 1000.0,
            old_balance_orig: 5000.0,
            new_balance_orig: 4000.0,
            old_balance_dest: 1000.0,
            new_balance_dest: 2000.0,
        }
    }
}

/// Validated transaction. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionRecord {
    step: u16,
    transaction_type: TransactionType,
    amount: f64,
    old_balance_orig: f64,
    new_balance_orig: f64,
    old_balance_dest: f64,
    new_balance_dest: f64,
}

impl TransactionRecord {
    /// Encode into the model's feature order.
    pub fn encode(&self) -> FeatureVector {
        FeatureVector::new([
            self.step as f64,
            self.transaction_type.code() as f64,
            self.amount,
            self.old_balance_orig,
            self.new_balance_orig,
            self.old_balance_dest,
            self.new_balance_dest,
        ])
    }
}

impl TryFrom<&TransactionInput> for TransactionRecord {
    type Error = EncodingError;

    fn try_from(input: &TransactionInput) -> Result<Self, Self::Error> {
        let transaction_type: TransactionType = input.transaction_type.parse()?;

        if !STEP_RANGE.contains(&input.step) {
            return Err(EncodingError::StepOutOfRange(input.step));
        }

        let amounts = [
            ("amount", input.amount),
            ("old_balance_orig", input.old_balance_orig),
            ("new_balance_orig", input.new_balance_orig),
            ("old_balance_dest", input.old_balance_dest),
            ("new_balance_dest", input.new_balance_dest),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(EncodingError::InvalidAmount { field, value });
            }
        }

        Ok(Self {
            step: input.step as u16,
            transaction_type,
            amount: input.amount,
            old_balance_orig: input.old_balance_orig,
            new_balance_orig: input.new_balance_orig,
            old_balance_dest: input.old_balance_dest,
            new_balance_dest: input.new_balance_dest,
        })
    }
}

/// Number of model input features.
pub const FEATURE_COUNT: usize = 7;

/// Column names of the model input, in order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "step",
    "type",
    "amount",
    "oldbalanceOrg",
    "newbalanceOrig",
    "oldbalanceDest",
    "newbalanceDest",
];

/// Model input row: step, type code, amount, then the four balances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn type_code(&self) -> f64 {
        self.0[1]
    }

    /// Single-precision copy for the ONNX input tensor.
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.0.map(|v| v as f32)
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = usize;

    /// Fails with the actual length when it is not [`FEATURE_COUNT`].
    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        <[f64; FEATURE_COUNT]>::try_from(values)
            .map(Self)
            .map_err(|_| len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip() {
        for ty in TransactionType::ALL {
            assert_eq!(ty.as_str().parse::<TransactionType>(), Ok(ty));
            assert_eq!(TransactionType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(" TRANSFER ".parse::<TransactionType>(), Ok(TransactionType::Transfer));
    }

    #[test]
    fn test_unknown_type_rejected() {
        for name in ["WIRE", "transfer", "CASH_IN", ""] {
            assert!(matches!(
                name.parse::<TransactionType>(),
                Err(EncodingError::UnknownTransactionType(_))
            ));
        }
    }

    #[test]
    fn test_record_validation() {
        let mut input = TransactionInput::default();
        input.step = 0;
        assert_eq!(
            TransactionRecord::try_from(&input),
            Err(EncodingError::StepOutOfRange(0))
        );

        let mut input = TransactionInput::default();
        input.step = 745;
        assert!(TransactionRecord::try_from(&input).is_err());

        let mut input = TransactionInput::default();
        input.new_balance_dest = -1.0;
        assert_eq!(
            TransactionRecord::try_from(&input),
            Err(EncodingError::InvalidAmount {
                field: "new_balance_dest",
                value: -1.0
            })
        );

        let mut input = TransactionInput::default();
        input.amount = f64::NAN;
        assert!(TransactionRecord::try_from(&input).is_err());
    }

    #[test]
    fn test_input_deserializes_dataset_column_names() {
        let json = r#"{"step":1,"type":"PAYMENT","amount":9839.64,"oldbalanceOrg":170136.0,
            "newbalanceOrig":160296.36,"oldbalanceDest":0.0,"newbalanceDest":0.0}"#;
        let input: TransactionInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.transaction_type, "PAYMENT");
        assert_eq!(input.old_balance_orig, 170136.0);
        assert_eq!(input.new_balance_orig, 160296.36);
    }

    #[test]
    fn test_feature_vector_from_vec() {
        let row = FeatureVector::try_from(vec![1.0, 3.0, 9.5, 10.0, 0.5, 0.0, 0.0]).unwrap();
        assert_eq!(row.type_code(), 3.0);
        assert_eq!(FeatureVector::try_from(vec![1.0, 2.0]), Err(2));
    }
}
