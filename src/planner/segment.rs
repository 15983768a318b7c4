//! Time-based splitting of an oversized file.

use serde::Serialize;

use super::{check_duration, check_target};
use crate::error::PlanError;

/// A contiguous slice of the source, exported as its own file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// 1-based position in the plan.
    pub index: usize,
    /// Offset into the source in seconds.
    pub start_secs: f64,
    /// Length of the slice in seconds.
    pub duration_secs: f64,
}

impl Segment {
    /// Offset at which this segment ends.
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// Ordered, contiguous segments covering the full source duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPlan {
    segments: Vec<Segment>,
}

impl SegmentPlan {
    /// Returns the segments in playback order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a produced plan.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment durations.
    pub fn total_duration_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }

    /// Iterates over segments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
}

impl<'a> IntoIterator for &'a SegmentPlan {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Upper bound on the segments produced for a single file.
pub const MAX_SEGMENTS: usize = 10_000;

/// Number of segments needed so each should land under the budget.
///
/// Fails when the count would exceed [`MAX_SEGMENTS`].
pub fn segment_count(size_mb: f64, target_mb: f64) -> Result<usize, PlanError> {
    let whole = (size_mb / target_mb).floor();
    if !whole.is_finite() || whole < 0.0 || whole >= MAX_SEGMENTS as f64 {
        return Err(PlanError::TooManySegments {
            size_mb,
            target_mb,
            max: MAX_SEGMENTS,
        });
    }
    Ok(whole as usize + 1)
}

/// Plans an even split of `duration_secs` into enough segments for `target_mb`.
///
/// Cuts are computed in floating-point seconds and not aligned to keyframes.
/// Callers must short-circuit files already within budget; those are rejected
/// here with [`PlanError::WithinBudget`].
pub fn plan(size_mb: f64, duration_secs: f64, target_mb: f64) -> Result<SegmentPlan, PlanError> {
    check_target(target_mb)?;
    if size_mb <= target_mb {
        return Err(PlanError::WithinBudget { size_mb, target_mb });
    }
    check_duration(duration_secs)?;

    let count = segment_count(size_mb, target_mb)?;
    let segment_duration = duration_secs / count as f64;

    let segments = (0..count)
        .map(|i| Segment {
            index: i + 1,
            start_secs: i as f64 * segment_duration,
            duration_secs: segment_duration,
        })
        .collect();

    Ok(SegmentPlan { segments })
}
