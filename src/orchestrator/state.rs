//! Per-asset processing states.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// Lifecycle of one asset within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Found by the directory scan.
    Discovered,
    /// Size (and duration, if over budget) measured.
    Measured,
    /// Already within budget; terminal.
    Skipped,
    /// A plan was produced.
    Planned,
    /// Jobs are being submitted.
    Executing,
    /// All jobs (and the replace step) succeeded; terminal.
    Done,
    /// Measurement, planning, a job or the replace step failed; terminal.
    Failed,
}

impl AssetState {
    /// Returns true if no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Done | Self::Failed)
    }

    /// Checks whether moving to `next` is a legal step.
    pub fn can_transition_to(&self, next: AssetState) -> bool {
        use AssetState::*;

        matches!(
            (self, next),
            (Discovered, Measured)
                | (Discovered, Failed)
                | (Measured, Skipped)
                | (Measured, Planned)
                | (Measured, Failed)
                | (Planned, Executing)
                | (Executing, Done)
                | (Executing, Failed)
        )
    }
}

/// Follows one asset through its states, logging every step.
#[derive(Debug)]
pub struct AssetTracker {
    path: PathBuf,
    state: AssetState,
    history: Vec<AssetState>,
}

impl AssetTracker {
    /// Starts tracking a freshly discovered asset.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            state: AssetState::Discovered,
            history: vec![AssetState::Discovered],
        }
    }

    /// Current state.
    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Every state visited so far, starting with `Discovered`.
    pub fn history(&self) -> &[AssetState] {
        &self.history
    }

    /// Moves to the next state.
    pub fn transition(&mut self, next: AssetState) {
        if !self.state.can_transition_to(next) {
            warn!(path = ?self.path, from = ?self.state, to = ?next, "Unexpected asset state transition");
        }
        debug!(path = ?self.path, from = ?self.state, to = ?next, "Asset state changed");
        self.state = next;
        self.history.push(next);
    }
}
