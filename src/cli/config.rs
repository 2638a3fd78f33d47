//! Config command handler

use anyhow::Result;
use std::path::Path;

use super::ConfigAction;
use crate::config::{ServerConfig, PROJECT_CONFIG_FILE};

pub fn run(action: ConfigAction, config: &ServerConfig, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = ServerConfig::init_project_config(Path::new("."))?;
            println!("Config file: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            match ServerConfig::user_config_path() {
                Some(path) => println!("# user config:    {}", path.display()),
                None => println!("# user config:    (no config directory)"),
            }
            let project = explicit
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| PROJECT_CONFIG_FILE.to_string());
            println!("# project config: {}", project);
            println!();
            print!("{}", config.resolved_toml()?);
            Ok(())
        }
    }
}
