//! Configuration module
//!
//! Layered server settings: bind address, classifier artifact and decision
//! threshold.

mod server_config;

pub use server_config::{
    DecisionConfig, HttpConfig, ModelConfig, ServerConfig, DEFAULT_BIND, DEFAULT_MODEL_PATH,
    ENV_BIND, ENV_MODEL, ENV_MODEL_FORMAT, ENV_THRESHOLD, PROJECT_CONFIG_FILE,
};
