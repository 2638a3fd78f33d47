//! Server configuration
//!
//! Supports loading config from, lowest priority first:
//! - Built-in defaults
//! - User config (~/.config/refactor-predictor/config.toml)
//! - Project config (`refactor-predictor.toml` in the working directory,
//!   or the file passed with `--config`)
//! - Environment variables
//!
//! CLI flags are applied on top by the command handlers.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [model]
//! path = "model.json"
//! format = "gbdt"      # or "xgboost"
//!
//! [decision]
//! threshold = 0.30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::classifier::{DecisionPolicy, ModelFormat, PREDICTION_THRESHOLD};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_MODEL_PATH: &str = "model.json";
pub const PROJECT_CONFIG_FILE: &str = "refactor-predictor.toml";

pub const ENV_MODEL: &str = "REFACTOR_PREDICTOR_MODEL";
pub const ENV_MODEL_FORMAT: &str = "REFACTOR_PREDICTOR_MODEL_FORMAT";
pub const ENV_BIND: &str = "REFACTOR_PREDICTOR_BIND";
pub const ENV_THRESHOLD: &str = "REFACTOR_PREDICTOR_THRESHOLD";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub decision: DecisionConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Address to listen on (default: 127.0.0.1:5000)
    pub bind: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Classifier artifact (default: model.json)
    pub path: Option<PathBuf>,

    /// Artifact format: "gbdt" (default) or "xgboost"
    pub format: Option<ModelFormat>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct DecisionConfig {
    /// Minimum "needs refactor" probability to flag code (default: 0.30)
    pub threshold: Option<f64>,
}

impl ServerConfig {
    /// Load config from all sources.
    ///
    /// A broken user config is skipped with a warning; a broken project or
    /// explicit config file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = ServerConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::from_file(&path) {
                Ok(user) => {
                    debug!("Loaded user config from {}", path.display());
                    config.merge(user);
                }
                Err(e) => warn!("Failed to load {}: {:#}", path.display(), e),
            }
        }

        let project_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(PROJECT_CONFIG_FILE)).filter(|p| p.exists()),
        };
        if let Some(path) = project_path {
            config.merge(Self::from_file(&path)?);
            debug!("Loaded project config from {}", path.display());
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a single TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("refactor-predictor").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: ServerConfig) {
        if other.server.bind.is_some() {
            self.server.bind = other.server.bind;
        }
        if other.model.path.is_some() {
            self.model.path = other.model.path;
        }
        if other.model.format.is_some() {
            self.model.format = other.model.format;
        }
        if other.decision.threshold.is_some() {
            self.decision.threshold = other.decision.threshold;
        }
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(model) = lookup(ENV_MODEL) {
            self.model.path = Some(PathBuf::from(model));
        }
        if let Some(format) = lookup(ENV_MODEL_FORMAT) {
            let format = format
                .parse::<ModelFormat>()
                .map_err(|e| anyhow::anyhow!("{ENV_MODEL_FORMAT}: {e}"))?;
            self.model.format = Some(format);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = Some(bind);
        }
        if let Some(threshold) = lookup(ENV_THRESHOLD) {
            let threshold = threshold
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{ENV_THRESHOLD} is not a number: {threshold}"))?;
            self.decision.threshold = Some(threshold);
        }
        Ok(())
    }

    pub fn bind(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn model_path(&self) -> &Path {
        self.model
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MODEL_PATH))
    }

    pub fn model_format(&self) -> ModelFormat {
        self.model.format.unwrap_or_default()
    }

    pub fn threshold(&self) -> f64 {
        self.decision.threshold.unwrap_or(PREDICTION_THRESHOLD)
    }

    /// Validated decision policy for the configured threshold
    pub fn decision_policy(&self) -> Result<DecisionPolicy> {
        DecisionPolicy::new(self.threshold()).map_err(|e| anyhow::anyhow!(e))
    }

    /// Effective settings rendered as TOML
    pub fn resolved_toml(&self) -> Result<String> {
        let resolved = ServerConfig {
            server: HttpConfig {
                bind: Some(self.bind().to_string()),
            },
            model: ModelConfig {
                path: Some(self.model_path().to_path_buf()),
                format: Some(self.model_format()),
            },
            decision: DecisionConfig {
                threshold: Some(self.threshold()),
            },
        };
        toml::to_string_pretty(&resolved).context("Failed to render config")
    }

    /// Write an example project config, leaving an existing file untouched
    pub fn init_project_config(dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(PROJECT_CONFIG_FILE);

        if !config_path.exists() {
            let example = r#"# refactor-predictor configuration

[server]
# bind = "127.0.0.1:5000"

[model]
# Classifier artifact, loaded once at startup
# path = "model.json"
# "gbdt" (gbdt-rs JSON) or "xgboost" (XGBoost JSON dump, binary:logistic)
# format = "gbdt"

[decision]
# Flag code when P(needs refactor) >= threshold
# threshold = 0.30
"#;
            std::fs::write(&config_path, example)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
        }

        Ok(config_path)
    }
}
