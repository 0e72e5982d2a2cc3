//! Configuration file support.
//!
//! An optional TOML file supplies logging settings and default run
//! parameters. Command-line flags always take precedence over it.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [defaults]
//! array_size = 8388608
//! num_times = 20
//! only = "Triad"
//! unit = "GiB"
//! backend = "rayon"
//! ```

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use memstream_common::Precision;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        // Keep result tables free of log noise unless asked for.
        Self { level: "warn".to_string(), format: LogFormat::default() }
    }
}

/// Run parameters used when the matching flag is absent.
///
/// Names are kept as strings and parsed with the same rules as the flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub array_size: Option<i64>,
    pub num_times: Option<usize>,
    pub device: Option<usize>,
    pub only: Option<String>,
    pub order: Option<String>,
    pub precision: Option<Precision>,
    pub unit: Option<String>,
    pub backend: Option<String>,
    pub silence_errors: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub logging: LoggingConfig,
    pub defaults: DefaultsConfig,
}

/// Builder layering flag overrides on top of a file or the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: CliConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: CliConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Self { config })
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.config.logging.level = level;
        }
        self
    }

    pub fn log_format(mut self, format: Option<LogFormat>) -> Self {
        if let Some(format) = format {
            self.config.logging.format = format;
        }
        self
    }

    pub fn build(self) -> Result<CliConfig> {
        if self.config.logging.level.trim().is_empty() {
            bail!("log level must not be empty");
        }
        Ok(self.config)
    }
}
