//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, ImagePreset, OptimizeOptions,
    OutputFormat, SETTINGS_SINGLETON_ID,
};

pub(crate) const APP_NAME: &str = "atelier";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from `config.toml` and CLI overrides.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Hosted backend connection.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Default optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Hosted backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Public anonymous API key.
    #[serde(default)]
    pub anon_key: String,

    /// Table holding the settings row.
    #[serde(default = "default_settings_table")]
    pub settings_table: String,

    /// Primary key of the settings row.
    #[serde(default = "default_settings_id")]
    pub settings_id: i64,

    /// Public media bucket.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Returns true if both URL and key are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            settings_table: default_settings_table(),
            settings_id: default_settings_id(),
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default optimizer settings, applied before any preset or CLI override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Maximum output width.
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Maximum output height.
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Quality factor from 0.0 to 1.0.
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::default(),
        }
    }
}

impl OptimizerConfig {
    /// Builds options from these defaults, with a preset's bounds if given.
    #[must_use]
    pub fn options(&self, preset: Option<ImagePreset>) -> OptimizeOptions {
        let (max_width, max_height) =
            preset.map_or((self.max_width, self.max_height), ImagePreset::bounds);
        OptimizeOptions {
            max_width,
            max_height,
            quality: self.quality,
            format: self.format,
        }
    }
}

fn default_settings_table() -> String {
    "settings".to_string()
}

const fn default_settings_id() -> i64 {
    SETTINGS_SINGLETON_ID
}

fn default_bucket() -> String {
    "images".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

const fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}

const fn default_quality() -> f32 {
    DEFAULT_QUALITY
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(url) = &args.backend_url {
            self.backend.url.clone_from(url);
        }
        if let Some(anon_key) = &args.anon_key {
            self.backend.anon_key.clone_from(anon_key);
        }
        if let Some(bucket) = &args.bucket {
            self.backend.bucket.clone_from(bucket);
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("atelier.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_sections() {
        let toml_content = r#"
            log_level = "debug"

            [backend]
            url = "https://abc.supabase.co"
            anon_key = "public-anon-key"
            bucket = "media"

            [optimizer]
            quality = 0.7
            format = "jpeg"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.backend.is_configured());
        assert_eq!(config.backend.bucket, "media");
        assert_eq!(config.backend.settings_table, "settings");
        assert_eq!(config.backend.settings_id, 1);
        assert_eq!(config.optimizer.format, OutputFormat::Jpeg);
        assert_eq!(config.optimizer.max_width, 800);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert!(!config.backend.is_configured());
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(
            config.optimizer.options(None),
            OptimizeOptions::default()
        );
    }

    #[test]
    fn test_preset_overrides_bounds_only() {
        let optimizer = OptimizerConfig {
            quality: 0.6,
            format: OutputFormat::Png,
            ..OptimizerConfig::default()
        };

        let options = optimizer.options(Some(ImagePreset::Hero));

        assert_eq!((options.max_width, options.max_height), (1920, 1080));
        assert_eq!(options.format, OutputFormat::Png);
        assert!((options.quality - 0.6).abs() < f32::EPSILON);
    }
}
