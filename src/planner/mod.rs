//! Sizing algorithms that turn a measured file into a transcode plan.
//!
//! Both planners are pure functions over measured values: the segment planner
//! divides a file's duration evenly into enough pieces that each should fit the
//! budget, and the bitrate planner derives the average video rate that would fill
//! the budget over the whole duration.

pub mod bitrate;
pub mod segment;

pub use bitrate::BitratePlan;
pub use segment::{Segment, SegmentPlan};

/// Kilobits per megabyte, used to turn a size budget into a bitrate.
pub const KBITS_PER_MB: f64 = 8192.0;

/// Bytes per megabyte.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// A plan for one asset, whichever strategy produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPlan {
    /// Split into segments.
    Segments(SegmentPlan),
    /// Re-encode at a target bitrate.
    Recode(BitratePlan),
}

fn check_duration(duration_secs: f64) -> Result<(), crate::error::PlanError> {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        Ok(())
    } else {
        Err(crate::error::PlanError::InvalidDuration {
            seconds: duration_secs,
        })
    }
}

fn check_target(target_mb: f64) -> Result<(), crate::error::PlanError> {
    if target_mb.is_finite() && target_mb > 0.0 {
        Ok(())
    } else {
        Err(crate::error::PlanError::InvalidTarget { target_mb })
    }
}
