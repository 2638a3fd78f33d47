//! GBDT model wrapper for refactor classification
//!
//! Wraps the `gbdt` crate to provide:
//! - Model loading from serialised JSON or XGBoost dump format
//! - Two-class probabilities for a [`FeatureVector`]
//!
//! Models are expected to use the `LogLikelyhood` loss (or XGBoost's
//! `binary:logistic`), so a prediction is the probability of label 1,
//! "needs refactor".
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while
//! `FeatureVector` exposes `f64`. Conversions happen at the crate boundary.

use std::io::Cursor;
use std::path::Path;

use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;

use super::features::FeatureVector;
use super::{ClassProbabilities, Classifier, ClassifierError};

/// Convert a `FeatureVector` to a `Vec<f32>` for the gbdt crate.
#[inline]
fn features_to_f32(features: &FeatureVector) -> Vec<f32> {
    features.values().iter().map(|&v| v as f32).collect()
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
pub struct GbdtClassifier {
    model: GBDT,
}

impl GbdtClassifier {
    /// Load a model from the gbdt-rs native JSON format on disk.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ClassifierError::Load("invalid UTF-8 in model path".to_string()))?;
        let model = GBDT::load_model(path_str)
            .map_err(|e| ClassifierError::Load(format!("failed to load GBDT model: {e}")))?;
        Ok(Self { model })
    }

    /// Load a model from an XGBoost JSON dump file on disk.
    ///
    /// Uses `binary:logistic` as the objective (sigmoid output).
    pub fn load_xgboost(path: &Path) -> Result<Self, ClassifierError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::Load(format!("failed to read XGBoost dump {}: {e}", path.display()))
        })?;
        Self::from_xgboost_json(&json)
    }

    /// Load a model from a JSON string (gbdt-rs native format).
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let model: GBDT = serde_json::from_str(json)
            .map_err(|e| ClassifierError::Load(format!("failed to parse GBDT JSON: {e}")))?;
        Ok(Self { model })
    }

    /// Load a model from an XGBoost JSON dump string.
    pub fn from_xgboost_json(json: &str) -> Result<Self, ClassifierError> {
        let reader = Cursor::new(json);
        let buf_reader = std::io::BufReader::new(reader);
        let model = GBDT::from_xgboost_reader(buf_reader, "binary:logistic")
            .map_err(|e| ClassifierError::Load(format!("failed to parse XGBoost JSON: {e}")))?;
        Ok(Self { model })
    }

    /// Wrap an already-trained `GBDT` instance.
    pub fn from_trained(model: GBDT) -> Self {
        Self { model }
    }
}

impl Classifier for GbdtClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, ClassifierError> {
        let data = vec![Data::new_test_data(features_to_f32(features), None)];
        let preds = self.model.predict(&data);
        let p = preds
            .first()
            .copied()
            .ok_or_else(|| ClassifierError::Inference("model returned no prediction".to_string()))?;
        ClassProbabilities::from_positive(f64::from(p))
    }
}
