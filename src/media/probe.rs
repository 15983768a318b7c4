//! Size and duration measurement of candidate files.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::encoder::MediaProcessor;
use crate::error::{AssetError, ProbeError};
use crate::planner::bytes_to_mb;

/// A measured candidate file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    /// File path.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Duration in seconds. Not probed for files already within budget.
    pub duration_secs: Option<f64>,
}

impl MediaAsset {
    /// File size in megabytes (1 MB = 1024 * 1024 bytes).
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }

    /// Returns true if the file already fits the budget.
    pub fn within_budget(&self, target_mb: f64) -> bool {
        self.size_mb() <= target_mb
    }
}

/// Reads a file's size in bytes.
pub fn measure_size(path: &Path) -> Result<u64, AssetError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AssetError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(AssetError::Metadata {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Probes a file's duration through the media processor.
pub async fn measure_duration<P>(processor: &P, path: &Path) -> Result<f64, AssetError>
where
    P: MediaProcessor + ?Sized,
{
    processor
        .probe_duration(path)
        .await
        .map_err(|source| AssetError::Probe {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses ffprobe's bare duration output.
///
/// Anything other than a single floating-point number ("N/A", empty output,
/// several lines) is a probe failure.
pub fn parse_duration(stdout: &str) -> Result<f64, ProbeError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| ProbeError::Unparseable {
            output: trimmed.to_string(),
        })
}
