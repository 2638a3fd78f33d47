//! CLI command definitions and handlers

mod config;
mod features;
mod predict;
mod serve;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::classifier::{self, FeatureExtractor, ModelFormat};
use crate::config::ServerConfig;
use crate::prediction::PredictionService;

/// Refactor Predictor - flag Python code that needs refactoring
#[derive(Parser, Debug)]
#[command(name = "refactor-predictor")]
#[command(
    version,
    about = "Serve a pre-trained refactor classifier over HTTP",
    long_about = "Extracts five static metrics from Python code (logical lines, comments, \
average and maximum cyclomatic complexity, function count) and asks a pre-trained \
classifier whether the code needs refactoring.",
    after_help = "\
Examples:
  refactor-predictor serve                           Serve on 127.0.0.1:5000 with ./model.json
  refactor-predictor serve --bind 0.0.0.0:8080       Listen on all interfaces
  refactor-predictor features app.py --json          Print the feature vector of a file
  refactor-predictor predict app.py                  One-shot prediction for a file
  cat app.py | refactor-predictor predict -          Read code from stdin"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./refactor-predictor.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override the classifier settings from config
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Classifier artifact path
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Classifier artifact format: gbdt or xgboost
    #[arg(long)]
    pub model_format: Option<ModelFormat>,

    /// Minimum "needs refactor" probability to flag code (0-1)
    #[arg(long)]
    pub threshold: Option<f64>,
}

impl ModelArgs {
    fn apply(self, config: &mut ServerConfig) {
        if self.model.is_some() {
            config.model.path = self.model;
        }
        if self.model_format.is_some() {
            config.model.format = self.model_format;
        }
        if self.threshold.is_some() {
            config.decision.threshold = self.threshold;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API (GET /, POST /api/predict)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print the feature vector of a Python file (`-` reads stdin)
    Features {
        /// Source file, or `-` for stdin
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a Python file without starting the server (`-` reads stdin)
    Predict {
        /// Source file, or `-` for stdin
        file: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example refactor-predictor.toml in the current directory
    Init,
    /// Show effective settings and config paths
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, model } => {
            if bind.is_some() {
                config.server.bind = bind;
            }
            model.apply(&mut config);
            serve::run(&config)
        }

        Commands::Features { file, json } => features::run(&file, json),

        Commands::Predict { file, model } => {
            model.apply(&mut config);
            predict::run(&file, &config)
        }

        Commands::Config { action } => config::run(action, &config, cli.config.as_deref()),
    }
}

/// Load the configured classifier and wire up the prediction service
pub(crate) fn build_service(config: &ServerConfig) -> Result<PredictionService> {
    let policy = config.decision_policy()?;
    let path = config.model_path();
    let classifier = classifier::load_classifier(path, config.model_format())
        .with_context(|| format!("Failed to load classifier from {}", path.display()))?;

    let service =
        PredictionService::new(FeatureExtractor::default(), Arc::new(classifier), policy);

    info!(
        "Loaded {} classifier from {} (threshold {:.2})",
        config.model_format(),
        path.display(),
        service.policy().threshold()
    );

    Ok(service)
}

/// Read source from a file, or from stdin when the path is `-`
pub(crate) fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
