//! ONNX model loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{info, warn};

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name (file stem)
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the feature tensor
    pub input_name: String,
    /// Output carrying the predicted class, if the export has one
    pub label_output: Option<String>,
    /// Output carrying class probabilities
    pub probability_output: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the classifier from file. Any failure here is fatal to startup.
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "model".to_string());

        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| anyhow::anyhow!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow::anyhow!("Failed to set optimization level: {}", e))?
            .with_intra_threads(self.onnx_threads)
            .map_err(|e| anyhow::anyhow!("Failed to set intra threads: {}", e))?
            .commit_from_file(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let (label_output, probability_output) = pick_outputs(&output_names);

        if label_output.is_none() {
            warn!(model = %name, "Model has no label output, labels will be derived from probabilities");
        }

        info!(
            model = %name,
            input = %input_name,
            label = ?label_output,
            probabilities = %probability_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name,
            session,
            input_name,
            label_output,
            probability_output,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

/// Choose the label and probability outputs from a model's output names.
///
/// Classifier exports name them `label` and `probabilities`; anything else
/// falls back to the last non-label output.
fn pick_outputs(names: &[String]) -> (Option<String>, String) {
    let label = names.iter().find(|n| n.contains("label")).cloned();

    let probabilities = names
        .iter()
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().rev().find(|n| !n.contains("label")))
        .cloned()
        .unwrap_or_else(|| "probabilities".to_string());

    (label, probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_outputs_classifier_export() {
        let (label, probs) = pick_outputs(&names(&["label", "probabilities"]));
        assert_eq!(label.as_deref(), Some("label"));
        assert_eq!(probs, "probabilities");
    }

    #[test]
    fn test_pick_outputs_without_label() {
        let (label, probs) = pick_outputs(&names(&["variable"]));
        assert_eq!(label, None);
        assert_eq!(probs, "variable");

        let (_, probs) = pick_outputs(&[]);
        assert_eq!(probs, "probabilities");
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let loader = ModelLoader::default();
        let err = loader
            .load_model("/nonexistent/fraud_model.onnx")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("Model file not found"));
    }
}
