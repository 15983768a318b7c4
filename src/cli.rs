//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::model::{AppConfig, Mode, VideoCodec};

/// Split or re-encode videos so every file fits under a size budget.
#[derive(Parser, Debug)]
#[command(name = "video-sizer", version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional YAML configuration file.
    #[arg(short, long, env = "VIDEO_SIZER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level requested by verbosity flags, if any.
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process every video file in a folder.
    Run(RunArgs),

    /// Measure a single file and print its plan without transcoding.
    Plan(PlanArgs),

    /// Validate the configuration and local ffmpeg build without processing.
    #[command(name = "config-validate")]
    ConfigValidate,

    /// Display the effective configuration.
    #[command(name = "config-show")]
    ConfigShow,
}

/// Arguments for the run subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Folder containing the videos.
    pub root: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Plan every file but do not transcode or modify anything.
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Write the batch summary as JSON to this path.
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

/// Arguments for the plan subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Video file to inspect.
    pub file: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Split into segments or re-encode in place.
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Size budget per output file in megabytes.
    #[arg(short, long, env = "VIDEO_SIZER_TARGET_MB")]
    pub target_size_mb: Option<f64>,

    /// Video codec.
    #[arg(long, value_enum)]
    pub codec: Option<VideoCodec>,

    /// Also process videos in subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Delete each original after all of its segments were written.
    #[arg(long)]
    pub delete_original: bool,
}

impl ConfigOverrides {
    /// Applies the overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(target) = self.target_size_mb {
            config.target_size_mb = target;
        }
        if let Some(codec) = self.codec {
            config.codec = codec;
        }
        if self.recursive {
            config.recursive = true;
        }
        if self.delete_original {
            config.delete_original_after_split = true;
        }
    }
}
