//! Prediction pipeline: extract features, classify, apply the threshold.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::classifier::{
    Classifier, ClassifierError, DecisionPolicy, FeatureExtractor, FeatureVector, Verdict,
};
use crate::metrics::AnalysisError;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("could not analyze code: {0}")]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub features: FeatureVector,
    pub verdict: Verdict,
}

/// Wire form of a prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResponse {
    /// 1 when the snippet should be refactored, 0 otherwise
    pub needs_refactor: u8,
    /// Percentage with two decimals
    pub confidence: String,
}

impl From<&Prediction> for PredictionResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            needs_refactor: u8::from(prediction.verdict.needs_refactor),
            confidence: prediction.verdict.confidence_label(),
        }
    }
}

/// Owns the loaded classifier and runs the prediction pipeline.
///
/// The classifier is injected once and only read afterwards, so a service
/// can be shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct PredictionService {
    extractor: FeatureExtractor,
    classifier: Arc<dyn Classifier>,
    policy: DecisionPolicy,
}

impl PredictionService {
    pub fn new(
        extractor: FeatureExtractor,
        classifier: Arc<dyn Classifier>,
        policy: DecisionPolicy,
    ) -> Self {
        Self {
            extractor,
            classifier,
            policy,
        }
    }

    /// Service with the default Python extractor and threshold
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self::new(
            FeatureExtractor::default(),
            classifier,
            DecisionPolicy::default(),
        )
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn predict(&self, code: &str) -> Result<Prediction, PredictError> {
        let features = self.extractor.extract(code)?;
        let probs = self.classifier.predict_proba(&features)?;
        let verdict = self.policy.decide(&probs);

        debug!(
            lloc = features.lloc,
            comments = features.comments,
            avg_complexity = features.avg_complexity,
            max_complexity = features.max_complexity,
            function_count = features.function_count,
            p_refactor = probs.needs_refactor,
            needs_refactor = verdict.needs_refactor,
            "prediction complete"
        );

        Ok(Prediction { features, verdict })
    }
}
