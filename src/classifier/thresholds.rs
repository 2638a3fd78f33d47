//! Refactor decision threshold
//!
//! The classifier's "needs refactor" probability is compared against a low,
//! inclusive threshold so that borderline snippets are flagged for review
//! rather than passed. Confidence always refers to the chosen verdict.

use super::ClassProbabilities;

/// Flag code when the model is at least 30% sure it needs refactoring
pub const PREDICTION_THRESHOLD: f64 = 0.30;

/// Outcome of applying the threshold to a probability distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub needs_refactor: bool,
    /// Probability of the chosen verdict, as a percentage (0..=100)
    pub confidence: f64,
}

impl Verdict {
    /// Confidence rendered with two decimals, e.g. `"85.00"`
    pub fn confidence_label(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}

/// Threshold policy over "needs refactor" probabilities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: PREDICTION_THRESHOLD,
        }
    }
}

impl DecisionPolicy {
    /// Build a policy with a custom threshold in `[0, 1]`
    pub fn new(threshold: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("threshold must be within [0, 1], got {threshold}"));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decide(&self, probs: &ClassProbabilities) -> Verdict {
        if probs.needs_refactor >= self.threshold {
            Verdict {
                needs_refactor: true,
                confidence: probs.needs_refactor * 100.0,
            }
        } else {
            Verdict {
                needs_refactor: false,
                confidence: probs.no_refactor * 100.0,
            }
        }
    }
}
