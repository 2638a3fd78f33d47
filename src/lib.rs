//! Refactor Predictor - flag Python code that needs refactoring
//!
//! Extracts five static metrics from a source snippet, feeds them to a
//! pre-trained classifier and thresholds the "needs refactor" probability.
//! The pipeline is exposed over HTTP (`server`) and on the command line
//! (`cli`).

pub mod classifier;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod prediction;
pub mod server;
