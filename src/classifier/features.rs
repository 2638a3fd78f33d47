//! Feature extraction for refactor classification
//!
//! Turns a source snippet into the five-value vector the classifier was
//! trained on. Field order is part of the model contract and must not change.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::metrics::{AnalysisError, MetricsBackend, PythonMetrics};

/// Number of features in a [`FeatureVector`]
pub const NUM_FEATURES: usize = 5;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "lloc",
    "comments",
    "avg_complexity",
    "max_complexity",
    "function_count",
];

/// Static metrics of one snippet, in model input order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Logical lines of code
    pub lloc: u32,
    /// Comment line count
    pub comments: u32,
    /// Average cyclomatic complexity across blocks (0 when there are none)
    pub avg_complexity: f64,
    /// Highest cyclomatic complexity (0 when there are no blocks)
    pub max_complexity: u32,
    /// Functions, methods and classes found
    pub function_count: u32,
}

impl FeatureVector {
    /// Values in model input order
    pub fn values(&self) -> [f64; NUM_FEATURES] {
        [
            f64::from(self.lloc),
            f64::from(self.comments),
            self.avg_complexity,
            f64::from(self.max_complexity),
            f64::from(self.function_count),
        ]
    }
}

/// Extracts feature vectors through a pluggable metrics backend
#[derive(Clone)]
pub struct FeatureExtractor {
    backend: Arc<dyn MetricsBackend>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PythonMetrics::new()))
    }
}

impl FeatureExtractor {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Extract the feature vector of `code`.
    ///
    /// Fails with [`AnalysisError::Empty`] for blank input and with the
    /// backend's error when the snippet cannot be analyzed.
    pub fn extract(&self, code: &str) -> Result<FeatureVector, AnalysisError> {
        if code.trim().is_empty() {
            return Err(AnalysisError::Empty);
        }

        let raw = self.backend.raw_metrics(code)?;
        let blocks = self.backend.complexity(code)?;

        let function_count = blocks.len() as u32;
        let (avg_complexity, max_complexity) = match blocks.iter().max_by_key(|b| b.complexity) {
            None => (0.0, 0),
            Some(top) => {
                debug!(
                    block = %top.name,
                    kind = ?top.kind,
                    line = top.line,
                    complexity = top.complexity,
                    "most complex block"
                );
                let total: u32 = blocks.iter().map(|b| b.complexity).sum();
                (f64::from(total) / f64::from(function_count), top.complexity)
            }
        };

        Ok(FeatureVector {
            lloc: raw.lloc,
            comments: raw.comments,
            avg_complexity,
            max_complexity,
            function_count,
        })
    }
}
