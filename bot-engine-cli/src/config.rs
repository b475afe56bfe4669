//! Configuration loading and parsing
//!
//! `botctl.toml` holds defaults for the `run` command; command-line flags
//! override anything set here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from botctl.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Lesson to run when --lesson is not given
    pub lesson: Option<String>,
    /// runtime.json replacing the lesson's built-in subscriptions
    pub runtime: Option<PathBuf>,
    /// Sleep until timers are due instead of advancing a virtual clock
    #[serde(default)]
    pub realtime: bool,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // Relative paths are relative to the config file
    if let (Some(runtime), Some(dir)) = (&config.run.runtime, path.parent()) {
        if runtime.is_relative() {
            config.run.runtime = Some(dir.join(runtime));
        }
    }

    Ok(config)
}
