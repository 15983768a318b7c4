//! External media tooling behind the [`MediaProcessor`] seam.

pub mod ffmpeg;
pub mod job;

use std::path::Path;

use async_trait::async_trait;

use crate::error::{EncoderError, ProbeError};
pub use ffmpeg::FfmpegProcessor;
pub use job::{CodecParams, JobMode, TranscodeJob};

/// Probes and transcodes media files.
///
/// Every call blocks the caller until the underlying tool exits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Returns the duration of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;

    /// Runs a single transcode job to completion.
    ///
    /// Success means the tool exited cleanly and the output file is non-empty.
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), EncoderError>;
}
