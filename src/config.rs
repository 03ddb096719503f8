//! User configuration
//!
//! Optional TOML file. Lookup order: `$HOLDINGS_CONFIG`, then
//! `$XDG_CONFIG_HOME/holdings/config.toml`, then the platform config directory.
//! A missing file yields the defaults; a malformed one is an error.
//!
//! ```toml
//! data_file = "/home/me/holdings.json"
//! decimals = 2
//! log_level = "info"
//!
//! [window]
//! start = "2024-01"
//! end = "2024-12"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::HoldingsError;
use crate::models::Month;
use crate::reports::DisplayWindow;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset used when `--data` is not given
    pub data_file: Option<PathBuf>,
    /// Decimal places shown in tables
    pub decimals: u32,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: Option<String>,
    /// Default display window
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub start: Option<Month>,
    pub end: Option<Month>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            decimals: 2,
            log_level: None,
            window: WindowConfig::default(),
        }
    }
}

impl Config {
    /// Config default window, with each side overridden by a CLI value when given
    pub fn display_window(&self, from: Option<Month>, to: Option<Month>) -> DisplayWindow {
        DisplayWindow::new(from.or(self.window.start), to.or(self.window.end))
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("holdings"))
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(explicit) = std::env::var_os("HOLDINGS_CONFIG") {
        return Ok(PathBuf::from(explicit));
    }
    Ok(get_config_dir()?.join(CONFIG_FILENAME))
}

pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| HoldingsError::ConfigError(e.to_string()).into())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn load_config() -> Result<Config> {
    match config_path() {
        Ok(path) => load_config_from(&path),
        // No resolvable config directory is not an error, just no config
        Err(_) => Ok(Config::default()),
    }
}
