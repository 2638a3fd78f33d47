//! One-shot prediction command handler

use anyhow::Result;
use std::path::Path;

use crate::config::ServerConfig;
use crate::prediction::{PredictError, PredictionResponse};
use crate::server::ANALYSIS_FAILED;

/// Classify a file and print the same JSON the HTTP API returns
pub fn run(file: &Path, config: &ServerConfig) -> Result<()> {
    let source = super::read_source(file)?;
    let service = super::build_service(config)?;

    match service.predict(&source) {
        Ok(prediction) => {
            let response = PredictionResponse::from(&prediction);
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
        Err(PredictError::Analysis(cause)) => {
            anyhow::bail!("{} ({}: {})", ANALYSIS_FAILED, file.display(), cause)
        }
        Err(e) => Err(e.into()),
    }
}
