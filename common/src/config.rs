//! Configuration system for the classification core.
//!
//! Supports:
//! - Environment variables (highest priority)
//! - TOML config file
//! - Defaults (lowest priority)
//!
//! There is no CLI surface; the host application decides where the TOML file
//! lives and hands the path to [`ModaicsConfig::load`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable names recognised by [`ModaicsConfig::apply_env_overrides`].
pub const ENV_API_BASE_URL: &str = "MODAICS_API_BASE_URL";
pub const ENV_API_VERSION: &str = "MODAICS_API_VERSION";
pub const ENV_RETRY_COUNT: &str = "MODAICS_RETRY_COUNT";
pub const ENV_TIMEOUT_SECS: &str = "MODAICS_TIMEOUT_SECS";
pub const ENV_LOG: &str = "MODAICS_LOG";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Full configuration (merged from all sources).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModaicsConfig {
    /// Remote analysis service settings
    pub api: ApiSettings,

    /// On-device pipeline settings
    pub pipeline: PipelineSettings,

    /// Fusion policy settings
    pub fusion: FusionSettings,

    /// Logging settings
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Scheme + host (+ optional port) of the Modaics API, no trailing path
    pub base_url: String,
    /// Version segment inserted as `/api/{version}/`
    pub api_version: String,
    /// Total attempts per logical call (first send included)
    pub retry_count: u32,
    /// Per-request transport timeout
    pub timeout_secs: u64,
    /// Length of one backoff unit; the delay after attempt `n` is `2^n` units
    pub backoff_unit_ms: u64,
    pub user_agent: String,
    /// Maximum number of downloaded images kept in memory
    pub image_cache_capacity: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_version: "v1".to_string(),
            retry_count: 3,
            timeout_secs: 30,
            backoff_unit_ms: 1000,
            user_agent: concat!("modaics-core/", env!("CARGO_PKG_VERSION")).to_string(),
            image_cache_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Detections below this confidence never become the dominant item
    pub detection_threshold: f32,
    /// Expected embedding length
    pub embedding_dimension: usize,
    /// Advisory latency target for the detection/embedding join
    pub latency_target_ms: u64,
    /// JPEG quality used when uploading photos for deep analysis
    pub jpeg_quality: u8,
    /// Fuse with local data only when the deep-analysis call fails
    pub fallback_to_local: bool,
    pub generate_story: bool,
    pub suggest_price: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            detection_threshold: 0.5,
            embedding_dimension: 512,
            latency_target_ms: 150,
            jpeg_quality: 85,
            fallback_to_local: false,
            generate_story: false,
            suggest_price: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Weight of the on-device confidence; the remote side gets `1 - local_weight`
    pub local_weight: f32,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self { local_weight: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ModaicsConfig {
    /// Load configuration from an optional TOML file, then the process environment.
    ///
    /// Priority: Environment > Config file > Defaults. A path that does not
    /// exist is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };

        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `MODAICS_*` overrides using `lookup` to read variables.
    ///
    /// Taking a lookup function instead of reading `std::env` directly keeps
    /// this testable without mutating process state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            self.api.api_version = version;
        }
        if let Some(value) = lookup(ENV_RETRY_COUNT) {
            self.api.retry_count = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_RETRY_COUNT,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_TIMEOUT_SECS,
                value: value.clone(),
            })?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Reject configurations the core cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        if self.api.retry_count == 0 {
            return Err(ConfigError::Invalid(
                "api.retry_count must allow at least one attempt".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.detection_threshold) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.detection_threshold {} outside [0, 1]",
                self.pipeline.detection_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.fusion.local_weight) {
            return Err(ConfigError::Invalid(format!(
                "fusion.local_weight {} outside [0, 1]",
                self.fusion.local_weight
            )));
        }
        if self.pipeline.embedding_dimension == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.embedding_dimension must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.pipeline.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.jpeg_quality {} outside 1..=100",
                self.pipeline.jpeg_quality
            )));
        }

        Ok(())
    }
}
