//! Refactor classifier
//!
//! Static metrics -> two-class probability -> thresholded verdict.
//!
//! The model itself is an opaque, pre-trained artifact loaded once at
//! startup. Anything that can turn a [`FeatureVector`] into a probability
//! distribution implements [`Classifier`], which keeps the decision logic
//! independent of the model format.

pub mod features;
pub mod gbdt_model;
pub mod thresholds;

pub use features::{FeatureExtractor, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use gbdt_model::GbdtClassifier;
pub use thresholds::{DecisionPolicy, Verdict, PREDICTION_THRESHOLD};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading or running a classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("{0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid probability {0}: expected a value within [0, 1]")]
    InvalidProbability(f64),
}

/// Probability of each class for one snippet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    /// Probability of class 0, "no refactor needed"
    pub no_refactor: f64,
    /// Probability of class 1, "needs refactor"
    pub needs_refactor: f64,
}

impl ClassProbabilities {
    /// Build the distribution from the probability of "needs refactor"
    pub fn from_positive(p: f64) -> Result<Self, ClassifierError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(ClassifierError::InvalidProbability(p));
        }
        Ok(Self {
            no_refactor: 1.0 - p,
            needs_refactor: p,
        })
    }
}

/// A pre-trained binary classifier over feature vectors
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, ClassifierError>;
}

/// On-disk format of a model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// gbdt-rs native JSON
    #[default]
    Gbdt,
    /// XGBoost JSON dump trained with `binary:logistic`
    Xgboost,
}

impl ModelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Gbdt => "gbdt",
            ModelFormat::Xgboost => "xgboost",
        }
    }
}

impl FromStr for ModelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelFormat::Gbdt),
            "xgboost" | "xgb" => Ok(ModelFormat::Xgboost),
            other => Err(format!(
                "unknown model format '{other}' (expected 'gbdt' or 'xgboost')"
            )),
        }
    }
}

impl std::fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load a classifier artifact from disk
pub fn load_classifier(path: &Path, format: ModelFormat) -> Result<GbdtClassifier, ClassifierError> {
    match format {
        ModelFormat::Gbdt => GbdtClassifier::load(path),
        ModelFormat::Xgboost => GbdtClassifier::load_xgboost(path),
    }
}
