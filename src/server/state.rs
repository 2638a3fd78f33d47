//! Shared state for HTTP handlers
//!
//! `AppState` wraps the prediction service, which holds the classifier
//! loaded at startup. Cloning is cheap; every request reads the same model.

use std::sync::Arc;

use crate::prediction::PredictionService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
