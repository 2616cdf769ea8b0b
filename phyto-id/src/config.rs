//! Effective resolver settings for phyto-id
//!
//! Resolves the values each tier needs from the bootstrap TOML, with
//! environment overrides where the deployment needs them.
//!
//! **Priority:** ENV → TOML → compiled default

use phyto_common::config::{IdentificationConfig, RemoteConfig, TomlConfig};
use phyto_common::{Error, Result};
use std::ops::Range;
use std::time::Duration;
use tracing::info;

/// Overrides `remote.api_base_url`
pub const API_URL_ENV_VAR: &str = "PHYTO_API_URL";

/// Settings for the remote tier
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    /// Base URL without trailing slash
    pub base_url: String,
    pub health_timeout: Duration,
    pub identify_timeout: Duration,
}

impl RemoteSettings {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            base_url: resolve_api_base_url(config),
            health_timeout: Duration::from_millis(config.health_timeout_ms),
            identify_timeout: Duration::from_millis(config.identify_timeout_ms),
        }
    }
}

/// Settings for the on-device tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnDeviceSettings {
    pub top_k: usize,
    /// Percent; results with a lower top confidence are discarded
    pub min_confidence: f32,
}

impl Default for OnDeviceSettings {
    fn default() -> Self {
        Self::from_config(&IdentificationConfig::default())
    }
}

impl OnDeviceSettings {
    pub fn from_config(config: &IdentificationConfig) -> Self {
        Self {
            top_k: config.top_k,
            min_confidence: config.min_confidence,
        }
    }
}

/// Settings for the placeholder tier
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSettings {
    /// Half-open confidence band for the primary pick
    pub primary_band: Range<f32>,
    /// Half-open confidence band for alternatives
    pub alternative_band: Range<f32>,
    pub max_alternatives: usize,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self::from_config(&IdentificationConfig::default())
    }
}

impl PlaceholderSettings {
    pub fn from_config(config: &IdentificationConfig) -> Self {
        Self {
            primary_band: config.placeholder_primary_min..config.placeholder_primary_max,
            alternative_band: config.placeholder_alternative_min
                ..config.placeholder_alternative_max,
            max_alternatives: config.placeholder_max_alternatives,
        }
    }

    /// Both bands must be non-empty and lie within 0..=100
    pub fn validate(&self) -> Result<()> {
        check_band("primary", &self.primary_band)?;
        check_band("alternative", &self.alternative_band)
    }
}

fn check_band(name: &str, band: &Range<f32>) -> Result<()> {
    let in_percent = |v: f32| (0.0..=100.0).contains(&v);
    if !in_percent(band.start) || !in_percent(band.end) || band.start >= band.end {
        return Err(Error::Config(format!(
            "Placeholder {name} band must satisfy 0 <= min < max <= 100, got [{}, {})",
            band.start, band.end
        )));
    }
    Ok(())
}

/// Everything the resolver tiers need
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    pub remote: RemoteSettings,
    pub on_device: OnDeviceSettings,
    pub placeholder: PlaceholderSettings,
}

impl ResolverSettings {
    /// Validate the TOML config and resolve effective settings
    pub fn resolve(config: &TomlConfig) -> Result<Self> {
        config.validate()?;

        let remote = RemoteSettings::from_config(&config.remote);
        if !remote.base_url.starts_with("http://") && !remote.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Inference service URL must be http(s), got '{}'",
                remote.base_url
            )));
        }

        Ok(Self {
            remote,
            on_device: OnDeviceSettings::from_config(&config.identification),
            placeholder: PlaceholderSettings::from_config(&config.identification),
        })
    }
}

/// Resolve the inference service base URL
///
/// **Priority:** `PHYTO_API_URL` → TOML (which carries the compiled default)
pub fn resolve_api_base_url(config: &RemoteConfig) -> String {
    if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
        if is_valid_url_value(&url) {
            info!("Inference service URL loaded from environment variable");
            return normalize_base_url(&url);
        }
    }

    normalize_base_url(&config.api_base_url)
}

/// Non-empty, non-whitespace
pub fn is_valid_url_value(value: &str) -> bool {
    !value.trim().is_empty()
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
