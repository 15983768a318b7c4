//! Configuration data structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure containing all settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Size budget per output file in megabytes.
    #[serde(default = "default_target_size_mb")]
    pub target_size_mb: f64,

    /// Whether oversized files are split into segments or re-encoded.
    #[serde(default)]
    pub mode: Mode,

    /// Video codec used for every transcode.
    #[serde(default)]
    pub codec: VideoCodec,

    /// Whether to scan subdirectories of the root folder.
    #[serde(default)]
    pub recursive: bool,

    /// Remove the source file once every segment was written.
    #[serde(default)]
    pub delete_original_after_split: bool,

    /// Audio settings applied to every transcode.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Video encoder tuning.
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Locations of the external media tools.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Processing mode for oversized files.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Split into time-based segments that each fit the budget.
    #[default]
    Segment,
    /// Re-encode the whole file at a bitrate derived from the budget and replace it.
    Recode,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Segment => write!(f, "segment"),
            Self::Recode => write!(f, "recode"),
        }
    }
}

/// Supported video codecs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum VideoCodec {
    /// H.264/AVC via x264.
    #[default]
    #[serde(rename = "libx264", alias = "x264", alias = "h264")]
    #[value(name = "libx264", alias = "x264", alias = "h264")]
    Libx264,
    /// H.265/HEVC via x265.
    #[serde(rename = "libx265", alias = "x265", alias = "hevc")]
    #[value(name = "libx265", alias = "x265", alias = "hevc")]
    Libx265,
    /// VP9 via libvpx.
    #[serde(rename = "libvpx-vp9", alias = "vp9")]
    #[value(name = "libvpx-vp9", alias = "vp9")]
    Vp9,
}

impl VideoCodec {
    /// Returns the ffmpeg encoder name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::Libx264 => "libx264",
            Self::Libx265 => "libx265",
            Self::Vp9 => "libvpx-vp9",
        }
    }

    /// libvpx has no `-preset` option.
    pub fn supports_preset(&self) -> bool {
        !matches!(self, Self::Vp9)
    }

    /// Highest CRF value the encoder accepts.
    pub fn max_crf(&self) -> u8 {
        match self {
            Self::Libx264 | Self::Libx265 => 51,
            Self::Vp9 => 63,
        }
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ffmpeg_name())
    }
}

/// Audio settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// FFmpeg audio encoder name.
    #[serde(default = "default_audio_codec")]
    pub codec: String,

    /// Constant audio bitrate (e.g. "128k").
    #[serde(default = "default_audio_bitrate")]
    pub bitrate: String,
}

/// Video encoder tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder speed preset (x264/x265 only).
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor passed alongside the target bitrate in recode mode.
    #[serde(default = "default_crf")]
    pub crf: u8,
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path or name of the ffmpeg binary.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Path or name of the ffprobe binary.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
}

// Default value functions

fn default_target_size_mb() -> f64 {
    8.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "128k".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_size_mb: default_target_size_mb(),
            mode: Mode::default(),
            codec: VideoCodec::default(),
            recursive: false,
            delete_original_after_split: false,
            audio: AudioConfig::default(),
            encoder: EncoderConfig::default(),
            tools: ToolsConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: default_audio_codec(),
            bitrate: default_audio_bitrate(),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            crf: default_crf(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}
