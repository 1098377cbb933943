//! Project configuration.
//!
//! An optional `iconforge.toml` in the project root overrides the stock
//! defaults. Missing file means stock defaults; a present file only needs the
//! keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # Platforms generated when --platform is not given.
//! platforms = ["android", "ios", "macos", "linux", "web", "windows", "store"]
//!
//! [opaque]
//! background = "#ffffff"    # Composite color for icons that must not be transparent
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::{Platform, UnknownPlatform, parse_platforms};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "iconforge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `iconforge.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Platform names generated when none are requested on the command line.
    pub platforms: Vec<String>,
    /// Opacity enforcement settings.
    pub opaque: OpaqueConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            platforms: Platform::defaults()
                .into_iter()
                .map(|p| p.name().to_string())
                .collect(),
            opaque: OpaqueConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl IconConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platforms.is_empty() {
            return Err(ConfigError::Validation("platforms must not be empty".into()));
        }
        self.default_platforms()
            .map_err(|e| ConfigError::Validation(format!("platforms: {e}")))?;
        parse_hex_color(&self.opaque.background).ok_or_else(|| {
            ConfigError::Validation(format!(
                "opaque.background must be #rrggbb, got '{}'",
                self.opaque.background
            ))
        })?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The configured default platform set, parsed.
    pub fn default_platforms(&self) -> Result<Vec<Platform>, UnknownPlatform> {
        parse_platforms(&self.platforms)
    }

    /// The composite color for opaque icons. White if unparsable.
    pub fn background(&self) -> Rgb<u8> {
        parse_hex_color(&self.opaque.background).unwrap_or(Rgb([255, 255, 255]))
    }
}

/// Opacity enforcement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpaqueConfig {
    /// `#rrggbb` color that transparent pixels are composited onto.
    pub background: String,
}

impl Default for OpaqueConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Option<Rgb<u8>> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock settings as a TOML table, the base every user file is laid over.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IconConfig::default())?)
}

/// Lay the user's `overlay` over `base`.
///
/// Sections such as `[opaque]` merge key by key, so a file that only sets
/// `background` keeps the stock `[processing]` values. Any other value,
/// including the `platforms` list, replaces the stock one outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(user)) => {
            for (key, value) in user {
                let value = match merged.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, user) => user,
    }
}

/// Read `iconforge.toml` from the project root, if the project has one.
pub fn read_user_config(project_root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = project_root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let user: toml::Value = toml::from_str(&fs::read_to_string(&path)?)?;
    Ok(Some(user))
}

/// Build the effective config from the stock settings and an optional user file.
///
/// Unknown keys and invalid values are rejected here, before any icon work.
pub fn resolve_config(user: Option<toml::Value>) -> Result<IconConfig, ConfigError> {
    let stock = stock_defaults_value()?;
    let merged = match user {
        Some(user) => merge_toml(stock, user),
        None => stock,
    };
    let config: IconConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Effective config for `project_root`: stock settings plus its `iconforge.toml`.
pub fn load_config(project_root: &Path) -> Result<IconConfig, ConfigError> {
    resolve_config(read_user_config(project_root)?)
}

/// Returns a fully-commented stock `iconforge.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# iconforge configuration
# =======================
# Place this file in the project root as iconforge.toml.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Platforms generated when --platform is not given.
# Available: android, ios, macos, linux, web, windows, store,
#            watchos, ios-legacy (the last two are opt-in only)
platforms = ["android", "ios", "macos", "linux", "web", "windows", "store"]

# ---------------------------------------------------------------------------
# Opacity enforcement
# ---------------------------------------------------------------------------
[opaque]
# iOS-family icons and the App Store listing cannot carry transparency.
# Transparent pixels are composited onto this color.
background = "#ffffff"

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel render workers.
# Omit to use all CPU cores. Values above the core count are clamped.
# max_processes = 4
"##
}
