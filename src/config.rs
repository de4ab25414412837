// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Categories, Config};
use crate::utils::log;

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing; a file that exists but does
/// not parse is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::warn(&format!(
            "Config file {} not found. Using default configuration.",
            path.display()
        ));
        return Ok(Config::default());
    }
    Config::load(path)
}

/// Load a config file, apply CLI overrides and validate the result.
pub fn load_with_overrides(path: &Path, categories: Option<Categories>) -> Result<Config> {
    let mut config = load_config(path)?;
    if let Some(categories) = categories {
        config.filter.categories = categories;
    }
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration in {}: {e}", path.display())))?;
    Ok(config)
}
