//! ONNX Runtime implementation of the fraud classifier

use crate::config::ModelConfig;
use crate::error::ClassifierError;
use crate::models::classifier::Classifier;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::transaction::{FeatureVector, FEATURE_COUNT};
use anyhow::Result;
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Raw model output for a batch of rows.
#[derive(Debug, Clone, PartialEq)]
struct RawScores {
    labels: Vec<i64>,
    probabilities: Vec<f64>,
}

/// Gradient-boosted classifier exported to ONNX.
pub struct OnnxClassifier {
    /// Session needs `&mut` to run, hence the lock
    model: Mutex<LoadedModel>,
}

impl OnnxClassifier {
    /// Load the model configured for this dashboard.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads);
        let model = loader.load_model(&config.path)?;

        info!(model = %model.name, "Classifier ready");

        Ok(Self {
            model: Mutex::new(model),
        })
    }

    /// Name of the loaded model.
    pub fn model_name(&self) -> String {
        self.model
            .lock()
            .map(|m| m.name.clone())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Run the model once over a batch of rows.
    fn run(&self, rows: &[FeatureVector]) -> Result<RawScores, ClassifierError> {
        if rows.is_empty() {
            return Ok(RawScores {
                labels: Vec::new(),
                probabilities: Vec::new(),
            });
        }

        let mut guard = self
            .model
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("Lock error: {}", e)))?;
        let model: &mut LoadedModel = &mut guard;

        let model_name = model.name.clone();
        let label_output = model.label_output.clone();
        let probability_output = model.probability_output.clone();

        // Input tensor - shape [rows, 7]
        let shape = vec![rows.len() as i64, FEATURE_COUNT as i64];
        let data: Vec<f32> = rows.iter().flat_map(|r| r.to_f32()).collect();
        let input_tensor = Tensor::from_array((shape, data))
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?;

        let outputs = model
            .session
            .run(ort::inputs![model.input_name.as_str() => input_tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let probabilities = extract_probabilities(&outputs, &probability_output, rows.len(), &model_name)?;

        let labels = match label_output.as_deref().and_then(|name| outputs.get(name)) {
            Some(output) => {
                let (_, data) = output
                    .try_extract_tensor::<i64>()
                    .map_err(|e| ClassifierError::Inference(format!("Failed to read labels: {}", e)))?;
                data.to_vec()
            }
            None => probabilities.iter().map(|&p| i64::from(p >= 0.5)).collect(),
        };

        debug!(model = %model_name, rows = rows.len(), "Inference complete");

        Ok(RawScores {
            labels,
            probabilities,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ClassifierError> {
        self.run(rows).map(|scores| scores.labels)
    }

    fn predict_probability(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError> {
        self.run(rows).map(|scores| scores.probabilities)
    }
}

/// Extract per-row fraud probability from model output.
/// Handles tensor outputs (XGBoost with zipmap disabled) and seq(map) outputs.
fn extract_probabilities(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    rows: usize,
    model_name: &str,
) -> Result<Vec<f64>, ClassifierError> {
    let output = outputs
        .get(output_name)
        .ok_or_else(|| ClassifierError::Inference(format!("Missing output '{}'", output_name)))?;

    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return Ok(fraud_column(&dims, data, rows));
    }

    let dtype = output.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        return extract_from_sequence_map(output, model_name);
    }

    warn!(model = %model_name, output = %output_name, "Unsupported probability output type");
    Err(ClassifierError::Inference(format!(
        "Unsupported output type for '{}'",
        output_name
    )))
}

/// Extract probabilities from seq(map(int64, float)), one map per row.
fn extract_from_sequence_map(
    output: &ort::value::DynValue,
    model_name: &str,
) -> Result<Vec<f64>, ClassifierError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ClassifierError::Inference(format!("Failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| ClassifierError::Inference(e.to_string()))?;

    let mut probabilities = Vec::with_capacity(maps.len());
    for map_value in &maps {
        let kv_pairs = map_value
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        probabilities.push(class_one_probability(&kv_pairs)?);
    }

    debug!(model = %model_name, rows = probabilities.len(), "Extracted from seq(map)");
    Ok(probabilities)
}

/// Fraud probability from one class->probability map.
fn class_one_probability(kv_pairs: &[(i64, f32)]) -> Result<f64, ClassifierError> {
    if let Some((_, prob)) = kv_pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(*prob as f64);
    }
    if let Some((_, prob)) = kv_pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - *prob as f64);
    }
    Err(ClassifierError::Inference("No probability found in map".to_string()))
}

/// Select the fraud-class column from a flat probability tensor.
///
/// `[rows, 2]` takes column 1, `[rows, 1]` or `[rows]` is already the fraud
/// probability.
fn fraud_column(dims: &[i64], data: &[f32], rows: usize) -> Vec<f64> {
    let width = match dims {
        [_, classes] => (*classes).max(1) as usize,
        _ => 1,
    };
    let column = if width >= 2 { 1 } else { 0 };

    (0..rows)
        .filter_map(|row| data.get(row * width + column))
        .map(|&p| p as f64)
        .collect()
}
