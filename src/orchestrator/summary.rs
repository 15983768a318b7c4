//! Per-asset outcomes and the batch summary.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AssetError;

/// Where an asset's processing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The file vanished or its metadata could not be read.
    Measure,
    /// The duration probe failed.
    Probe,
    /// No plan could be made from the measured values.
    Plan,
    /// A transcode job failed.
    Job,
    /// The post-transcode swap failed; the original is preserved.
    Replace,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Measure => "measure",
            Self::Probe => "probe",
            Self::Plan => "plan",
            Self::Job => "job",
            Self::Replace => "replace",
        };
        write!(f, "{}", name)
    }
}

/// Final result for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    /// Already within budget; no jobs issued.
    Skipped { size_mb: f64 },
    /// Every job succeeded.
    Succeeded { jobs: usize, outputs: Vec<PathBuf> },
    /// Dry run: jobs were planned but not executed.
    Planned { jobs: usize },
    /// Processing stopped at `stage`.
    Failed {
        stage: FailureStage,
        /// 1-based job number for job failures.
        job: Option<usize>,
        error: String,
    },
}

impl AssetOutcome {
    /// Returns true for failed outcomes.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<&AssetError> for AssetOutcome {
    fn from(error: &AssetError) -> Self {
        let (stage, job) = match error {
            AssetError::NotFound { .. } | AssetError::Metadata { .. } => {
                (FailureStage::Measure, None)
            }
            AssetError::Probe { .. } => (FailureStage::Probe, None),
            AssetError::Plan { .. } => (FailureStage::Plan, None),
            AssetError::Job { job, .. } => (FailureStage::Job, Some(*job)),
            AssetError::Replace { .. } => (FailureStage::Replace, None),
        };

        Self::Failed {
            stage,
            job,
            error: error.to_string(),
        }
    }
}

impl fmt::Display for AssetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { size_mb } => write!(f, "skipped ({:.2} MB, within budget)", size_mb),
            Self::Succeeded { jobs, .. } => write!(f, "succeeded ({} job(s))", jobs),
            Self::Planned { jobs } => write!(f, "planned ({} job(s), dry run)", jobs),
            Self::Failed {
                stage: FailureStage::Job,
                job: Some(job),
                error,
            } => write!(f, "failed at job {}: {}", job, error),
            Self::Failed { stage, error, .. } => write!(f, "failed at {}: {}", stage, error),
        }
    }
}

/// One line of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    /// Asset path.
    pub path: PathBuf,
    /// What happened to it.
    pub outcome: AssetOutcome,
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub planned: usize,
    pub failed: usize,
}

/// Results of processing a batch of assets.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// When processing began.
    pub started_at: DateTime<Utc>,
    /// When the last asset finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Per-asset results in processing order.
    pub assets: Vec<AssetReport>,
    /// Outcome counts, filled in by `finish`.
    pub counts: SummaryCounts,
}

impl BatchSummary {
    /// Starts an empty summary.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            assets: Vec::new(),
            counts: SummaryCounts::default(),
        }
    }

    /// Records one asset's outcome.
    pub fn record(&mut self, path: &Path, outcome: AssetOutcome) {
        let counts = &mut self.counts;
        counts.total += 1;
        match &outcome {
            AssetOutcome::Skipped { .. } => counts.skipped += 1,
            AssetOutcome::Succeeded { .. } => counts.succeeded += 1,
            AssetOutcome::Planned { .. } => counts.planned += 1,
            AssetOutcome::Failed { .. } => counts.failed += 1,
        }

        self.assets.push(AssetReport {
            path: path.to_path_buf(),
            outcome,
        });
    }

    /// Marks the batch as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if at least one asset failed.
    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
    }

    /// 0 when every asset succeeded, was skipped or planned; 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }

    /// Renders the per-asset lines and totals for the terminal.
    pub fn render(&self) -> String {
        if self.assets.is_empty() {
            return "No video files found.\n".to_string();
        }

        let mut out = String::new();
        for report in &self.assets {
            out.push_str(&format!("{}: {}\n", report.path.display(), report.outcome));
        }

        let c = &self.counts;
        out.push_str("---\n");
        out.push_str(&format!(
            "{} file(s): {} succeeded, {} skipped, {} failed",
            c.total, c.succeeded, c.skipped, c.failed
        ));
        if c.planned > 0 {
            out.push_str(&format!(", {} planned", c.planned));
        }
        out.push('\n');
        out
    }

    /// Writes the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()
    }
}
