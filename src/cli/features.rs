//! Feature extraction command handler

use anyhow::Result;
use std::path::Path;

use crate::classifier::{FeatureExtractor, FeatureVector, FEATURE_NAMES};

pub fn run(file: &Path, json: bool) -> Result<()> {
    let source = super::read_source(file)?;
    let features = FeatureExtractor::default()
        .extract(&source)
        .map_err(|e| anyhow::anyhow!("Could not analyze {}: {}", file.display(), e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        print!("{}", format_table(&features));
    }
    Ok(())
}

fn format_table(features: &FeatureVector) -> String {
    let mut out = String::new();
    for (name, value) in FEATURE_NAMES.iter().zip(features.values()) {
        if value.fract() == 0.0 {
            out.push_str(&format!("{:<16} {}\n", name, value as u64));
        } else {
            out.push_str(&format!("{:<16} {:.2}\n", name, value));
        }
    }
    out
}
