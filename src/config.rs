//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.policyscope.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Policy service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Chart rendering settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report output path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "policy_report.md".to_string()
}

/// Policy service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the policy service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Policy id to detail when the CLI does not supply one.
    #[serde(default)]
    pub default_policy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
            default_policy: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Render and export chart artifacts.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory the artifacts are written into.
    #[serde(default = "default_charts_dir")]
    pub dir: String,

    /// Chart width in pixels.
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_charts_dir(),
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_charts_dir() -> String {
    "charts".to_string()
}

// Same surface the original dashboard drew on.
fn default_chart_width() -> u32 {
    400
}

fn default_chart_height() -> u32 {
    200
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".policyscope.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. Settings
    /// are only overridden when the CLI provided an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref endpoint) = args.endpoint {
            self.api.endpoint = endpoint.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(ref policy) = args.policy {
            self.api.default_policy = Some(policy.clone());
        }
        if let Some(ref output) = args.output {
            self.general.output = output.to_string_lossy().to_string();
        }
        if let Some(ref dir) = args.charts_dir {
            self.charts.dir = dir.to_string_lossy().to_string();
        }
        if args.no_charts {
            self.charts.enabled = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
