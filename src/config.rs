// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{OcrError, Result};
use crate::models::{ExtractionMode, FormatOption};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openrouter/optimus-alpha";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "OCR_STREAM";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub mode: ExtractionMode,
    #[serde(default = "default_formatting")]
    pub formatting: Vec<FormatOption>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default = "default_true")]
    pub spinner: bool,
}

fn default_formatting() -> Vec<FormatOption> {
    vec![FormatOption::PreserveLayout]
}

fn default_true() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout_secs: None,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Standard,
            formatting: default_formatting(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            spinner: true,
        }
    }
}

impl OutputConfig {
    /// A command-line choice wins over the configured setting.
    pub fn color_enabled(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.color)
    }
}

impl Config {
    /// Built-in defaults, then the TOML file, then `OCR_STREAM__<SECTION>__<KEY>`.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        match path {
            Some(path) => Self::load_layered(path, true, environment()),
            None => Self::load_layered(Path::new(DEFAULT_CONFIG_PATH), false, environment()),
        }
    }

    fn load_layered(path: &Path, required: bool, env: config::Environment) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| OcrError::Config(e.to_string()))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).required(required))
            .add_source(env)
            .build()
            .map_err(|e| OcrError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| OcrError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            provider: ProviderConfig::default(),
            extraction: ExtractionConfig::default(),
            output: OutputConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(OcrError::Config("provider.model must not be empty".to_string()));
        }

        Validator::validate_url(&self.provider.base_url)
            .map_err(|e| OcrError::Config(format!("provider.base_url: {}", e)))?;

        if self.provider.connect_timeout_secs == Some(0) {
            return Err(OcrError::Config(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
