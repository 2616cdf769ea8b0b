//! Configuration loading and config file resolution
//!
//! Bootstrap configuration lives in a single TOML file. Every field has a
//! compiled default, so a missing file (or a missing section) never prevents
//! startup: it is logged and the defaults are used.
//!
//! # Config file priority
//! 1. Command-line argument (highest priority)
//! 2. `PHYTO_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/phyto/phyto-id.toml` on Linux)
//! 4. Compiled defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PHYTO_CONFIG";

const CONFIG_DIR_NAME: &str = "phyto";
const CONFIG_FILE_NAME: &str = "phyto-id.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub identification: IdentificationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Remote inference service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the inference service (overridden by `PHYTO_API_URL`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Health check timeout
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
    /// Identification request timeout
    #[serde(default = "default_identify_timeout_ms")]
    pub identify_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            health_timeout_ms: default_health_timeout_ms(),
            identify_timeout_ms: default_identify_timeout_ms(),
        }
    }
}

/// On-device classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Bundled ONNX model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Class names (JSON array, index-aligned with the model output)
    #[serde(default = "default_class_names_path")]
    pub class_names_path: PathBuf,
    /// Persisted copy of the model, tried before `model_path`
    #[serde(default = "default_model_cache_dir")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_input_size")]
    pub input_width: u32,
    #[serde(default = "default_input_size")]
    pub input_height: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            class_names_path: default_class_names_path(),
            cache_dir: default_model_cache_dir(),
            input_width: default_input_size(),
            input_height: default_input_size(),
        }
    }
}

/// Ranking and placeholder tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationConfig {
    /// Number of classes kept from the on-device output
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum top confidence (percent) for an on-device result
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    #[serde(default = "default_placeholder_primary_min")]
    pub placeholder_primary_min: f32,
    #[serde(default = "default_placeholder_primary_max")]
    pub placeholder_primary_max: f32,
    #[serde(default = "default_placeholder_alternative_min")]
    pub placeholder_alternative_min: f32,
    #[serde(default = "default_placeholder_alternative_max")]
    pub placeholder_alternative_max: f32,
    #[serde(default = "default_placeholder_max_alternatives")]
    pub placeholder_max_alternatives: usize,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_confidence: default_min_confidence(),
            placeholder_primary_min: default_placeholder_primary_min(),
            placeholder_primary_max: default_placeholder_primary_max(),
            placeholder_alternative_min: default_placeholder_alternative_min(),
            placeholder_alternative_max: default_placeholder_alternative_max(),
            placeholder_max_alternatives: default_placeholder_max_alternatives(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_health_timeout_ms() -> u64 {
    3000
}

fn default_identify_timeout_ms() -> u64 {
    30_000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/plant_model/model.onnx")
}

fn default_class_names_path() -> PathBuf {
    PathBuf::from("models/plant_model/class_names.json")
}

fn default_model_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(CONFIG_DIR_NAME).join("models"))
}

fn default_input_size() -> u32 {
    224 // MobileNetV2 input
}

fn default_top_k() -> usize {
    5
}

fn default_min_confidence() -> f32 {
    30.0
}

fn default_placeholder_primary_min() -> f32 {
    75.0
}

fn default_placeholder_primary_max() -> f32 {
    95.0
}

fn default_placeholder_alternative_min() -> f32 {
    30.0
}

fn default_placeholder_alternative_max() -> f32 {
    60.0
}

fn default_placeholder_max_alternatives() -> usize {
    2
}

impl TomlConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.remote.api_base_url.trim().is_empty() {
            return Err(Error::Config("remote.api_base_url must not be empty".to_string()));
        }
        if self.remote.health_timeout_ms == 0 || self.remote.identify_timeout_ms == 0 {
            return Err(Error::Config("remote timeouts must be greater than zero".to_string()));
        }
        if self.model.input_width == 0 || self.model.input_height == 0 {
            return Err(Error::Config("model input dimensions must be non-zero".to_string()));
        }

        let ident = &self.identification;
        if ident.top_k == 0 {
            return Err(Error::Config("identification.top_k must be at least 1".to_string()));
        }
        if !(0.0..=100.0).contains(&ident.min_confidence) {
            return Err(Error::Config(format!(
                "identification.min_confidence must be within 0-100, got {}",
                ident.min_confidence
            )));
        }
        validate_band(
            "placeholder_primary",
            ident.placeholder_primary_min,
            ident.placeholder_primary_max,
        )?;
        validate_band(
            "placeholder_alternative",
            ident.placeholder_alternative_min,
            ident.placeholder_alternative_max,
        )?;

        Ok(())
    }
}

fn validate_band(name: &str, min: f32, max: f32) -> Result<()> {
    if !(0.0..=100.0).contains(&min) || !(0.0..=100.0).contains(&max) || min >= max {
        return Err(Error::Config(format!(
            "identification.{name} band must satisfy 0 <= min < max <= 100, got [{min}, {max})"
        )));
    }
    Ok(())
}

/// Platform config file location (may not exist)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve which config file to read, if any
///
/// An explicit path (CLI or environment) is returned even when the file does
/// not exist, so that `load_toml_config` can report it. The platform default
/// is only returned when present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|p| p.exists())
}

/// Load and validate the TOML config at `path`
///
/// A missing file is not an error: a warning is logged and compiled defaults
/// are returned. A file that exists but does not parse is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve and load configuration in one step
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_toml_config(&path),
        None => {
            info!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.identification.top_k, 5);
        assert_eq!(config.identification.min_confidence, 30.0);
        assert_eq!(config.remote.health_timeout_ms, 3000);
        assert_eq!(config.model.input_width, 224);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [identification]
            top_k = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.identification.top_k, 3);
        assert_eq!(config.identification.min_confidence, 30.0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.remote.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = TomlConfig::default();
        config.identification.top_k = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = TomlConfig::default();
        config.identification.placeholder_primary_min = 95.0;
        config.identification.placeholder_primary_max = 75.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_floor_out_of_range_rejected() {
        let mut config = TomlConfig::default();
        config.identification.min_confidence = 120.0;
        assert!(config.validate().is_err());
    }
}
