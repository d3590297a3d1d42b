//! Command-line arguments.

use super::app_config::LogLevel;
use crate::domain::entities::{ImagePreset, OptimizeOptions, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "atelier",
    version,
    about = "Site settings and upload image tooling for the studio backend",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Backend project URL.
    #[arg(long, env = "ATELIER_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Backend anonymous API key.
    #[arg(long, env = "ATELIER_ANON_KEY", hide_env_values = true, global = true)]
    pub anon_key: Option<String>,

    /// Media bucket for uploads.
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the site settings record and print it as JSON.
    Settings,

    /// Optimize an image and write the result to disk.
    Optimize {
        /// Source image.
        input: PathBuf,

        /// Output directory (defaults to the input's directory).
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OptimizeArgs,
    },

    /// Validate, optimize and upload an image to the media bucket.
    Upload {
        /// Source image.
        input: PathBuf,

        #[command(flatten)]
        options: OptimizeArgs,
    },
}

/// Per-call optimizer overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct OptimizeArgs {
    /// Named bounds preset.
    #[arg(long, value_enum)]
    pub preset: Option<ImagePreset>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Quality factor from 0.0 to 1.0.
    #[arg(long)]
    pub quality: Option<f32>,

    /// Maximum output width in pixels.
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum output height in pixels.
    #[arg(long)]
    pub max_height: Option<u32>,
}

impl OptimizeArgs {
    /// Applies explicit overrides on top of `base`.
    #[must_use]
    pub fn apply(&self, mut base: OptimizeOptions) -> OptimizeOptions {
        if let Some(format) = self.format {
            base.format = format;
        }
        if let Some(quality) = self.quality {
            base.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            base.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            base.max_height = max_height;
        }
        base
    }
}
