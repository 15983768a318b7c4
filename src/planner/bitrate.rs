//! Target bitrate for a whole-file re-encode.

use serde::Serialize;

use super::{check_duration, check_target, KBITS_PER_MB};
use crate::error::PlanError;

/// Lowest video bitrate worth asking the encoder for, in kbps.
pub const MIN_VIDEO_KBPS: f64 = 1.0;

/// The average video rate requested from the encoder.
///
/// This is a target, not a guarantee: the encoder's rate control decides the
/// achieved size, and audio plus container overhead come on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitratePlan {
    /// Requested video bitrate in kilobits per second.
    pub target_video_kbps: f64,
}

impl BitratePlan {
    /// Formats the bitrate as an ffmpeg `-b:v` value, never below [`MIN_VIDEO_KBPS`].
    pub fn ffmpeg_value(&self) -> String {
        format!("{:.2}k", self.target_video_kbps.max(MIN_VIDEO_KBPS))
    }
}

/// Computes `target_mb * 8192 / duration_secs`.
///
/// Fails when the result drops below [`MIN_VIDEO_KBPS`].
pub fn plan(duration_secs: f64, target_mb: f64) -> Result<BitratePlan, PlanError> {
    check_duration(duration_secs)?;
    check_target(target_mb)?;

    let kbps = target_mb * KBITS_PER_MB / duration_secs;
    if kbps < MIN_VIDEO_KBPS {
        return Err(PlanError::BitrateTooLow {
            kbps,
            min_kbps: MIN_VIDEO_KBPS,
        });
    }

    Ok(BitratePlan {
        target_video_kbps: kbps,
    })
}
