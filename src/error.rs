//! Error types for the video sizer.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// Configuration loading and parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Config validation failed with {error_count} error(s)")]
    ValidationFailed { error_count: usize },
}

/// Errors raised while enumerating candidate files.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root folder does not exist: '{path}'")]
    RootNotFound { path: PathBuf },

    #[error("Root path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },
}

/// Duration probe failures. Any of these is terminal for the asset.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run ffprobe: {0}")]
    SpawnFailed(String),

    #[error("ffprobe exited with code {code}: {stderr}")]
    ProbeFailed { code: i32, stderr: String },

    #[error("ffprobe output is not a duration: '{output}'")]
    Unparseable { output: String },
}

/// Planning failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Invalid duration {seconds} s, must be a positive number of seconds")]
    InvalidDuration { seconds: f64 },

    #[error("Invalid target size {target_mb} MB, must be positive")]
    InvalidTarget { target_mb: f64 },

    #[error("Size {size_mb:.2} MB is already within the {target_mb} MB budget")]
    WithinBudget { size_mb: f64, target_mb: f64 },

    #[error("Splitting {size_mb:.2} MB into {target_mb} MB pieces needs more than {max} segments")]
    TooManySegments {
        size_mb: f64,
        target_mb: f64,
        max: usize,
    },

    #[error("Target video bitrate {kbps:.4} kbps is below the {min_kbps} kbps minimum")]
    BitrateTooLow { kbps: f64, min_kbps: f64 },
}

/// Transcode invocation errors.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("FFmpeg failed with exit code {code}: {stderr}")]
    FfmpegFailed { code: i32, stderr: String },

    #[error("Process spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Output file was not created: '{path}'")]
    MissingOutput { path: PathBuf },

    #[error("Output file is empty: '{path}'")]
    EmptyOutput { path: PathBuf },
}

/// Per-asset failures, caught and reported at the orchestrator boundary.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Failed to read metadata of '{path}': {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to probe '{path}': {source}")]
    Probe { path: PathBuf, source: ProbeError },

    #[error("Cannot plan '{path}': {source}")]
    Plan { path: PathBuf, source: PlanError },

    #[error("Job {job}/{total} failed for '{path}': {source}")]
    Job {
        path: PathBuf,
        job: usize,
        total: usize,
        source: EncoderError,
    },

    #[error("Failed to replace '{path}' with '{temp_output}' (original preserved): {message}")]
    Replace {
        path: PathBuf,
        temp_output: PathBuf,
        message: String,
    },
}

/// Capability detection errors.
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Failed to run '{command}': {message}")]
    CommandFailed { command: String, message: String },

    #[error("Required tool '{tool}' not found")]
    ToolNotFound { tool: String },
}
