//! Transcode job definitions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::model::{AppConfig, VideoCodec};
use crate::planner::{BitratePlan, Segment};

/// Prefix of the temporary output written next to the original in recode mode.
pub const TEMP_OUTPUT_PREFIX: &str = "temp_compressed_";

/// A single request to the external encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeJob {
    /// Path to the source file.
    pub input: PathBuf,
    /// Path the encoder writes to.
    pub output: PathBuf,
    /// What slice of the source to encode, and how.
    pub mode: JobMode,
    /// Codec settings shared by every job of a run.
    pub params: CodecParams,
}

/// Job-specific encoding mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JobMode {
    /// Encode `duration_secs` starting at `start_secs`.
    Segment {
        /// 1-based segment number.
        index: usize,
        /// Offset into the source in seconds.
        start_secs: f64,
        /// Length of the slice in seconds.
        duration_secs: f64,
    },
    /// Re-encode the whole file at a target video bitrate.
    Recode {
        /// Requested video bitrate in kbps.
        target_video_kbps: f64,
    },
}

/// Codec settings for a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodecParams {
    /// Video encoder.
    pub video_codec: VideoCodec,
    /// Encoder preset, when the codec supports one.
    pub preset: Option<String>,
    /// Constant rate factor (recode mode only).
    pub crf: u8,
    /// FFmpeg audio encoder name.
    pub audio_codec: String,
    /// Constant audio bitrate.
    pub audio_bitrate: String,
}

impl CodecParams {
    /// Builds codec parameters from the effective configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            video_codec: config.codec,
            preset: config
                .codec
                .supports_preset()
                .then(|| config.encoder.preset.clone()),
            crf: config.encoder.crf,
            audio_codec: crate::validation::codec::normalize_codec_name(&config.audio.codec),
            audio_bitrate: config.audio.bitrate.clone(),
        }
    }
}

impl TranscodeJob {
    /// Creates the job that exports one segment next to the source.
    pub fn segment(input: &Path, segment: &Segment, params: CodecParams) -> Self {
        Self {
            input: input.to_path_buf(),
            output: segment_output_path(input, segment.index),
            mode: JobMode::Segment {
                index: segment.index,
                start_secs: segment.start_secs,
                duration_secs: segment.duration_secs,
            },
            params,
        }
    }

    /// Creates the job that re-encodes the source into a temporary sibling.
    pub fn recode(input: &Path, plan: &BitratePlan, params: CodecParams) -> Self {
        Self {
            input: input.to_path_buf(),
            output: temp_output_path(input),
            mode: JobMode::Recode {
                target_video_kbps: plan.target_video_kbps,
            },
            params,
        }
    }

    /// Short label for logs and reports.
    pub fn label(&self) -> String {
        match self.mode {
            JobMode::Segment { index, .. } => format!("segment {}", index),
            JobMode::Recode { .. } => "recode".to_string(),
        }
    }
}

/// `<dir>/<stem>_part<index>.mp4`
pub fn segment_output_path(input: &Path, index: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("video"));

    let mut name = stem;
    name.push(format!("_part{}.mp4", index));
    input.with_file_name(name)
}

/// `<dir>/temp_compressed_<filename>`
pub fn temp_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(TEMP_OUTPUT_PREFIX);
    if let Some(file_name) = input.file_name() {
        name.push(file_name);
    }
    input.with_file_name(name)
}
