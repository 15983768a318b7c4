//! Batch processing: measure, plan, transcode and replace, one asset at a time.

pub mod replace;
pub mod state;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::model::{AppConfig, Mode};
use crate::encoder::{CodecParams, MediaProcessor, TranscodeJob};
use crate::error::AssetError;
use crate::media::probe::{measure_duration, measure_size};
use crate::media::MediaAsset;
use crate::planner::{self, AssetPlan};
use crate::scanner::FolderScanner;

pub use state::{AssetState, AssetTracker};
pub use summary::{AssetOutcome, BatchSummary, FailureStage};

/// Drives assets through measurement, planning and execution.
///
/// Assets are processed strictly one after another and every job is awaited
/// before the next is issued. Per-asset errors never abort the batch.
pub struct Orchestrator<P> {
    processor: P,
    config: AppConfig,
    dry_run: bool,
}

impl<P: MediaProcessor> Orchestrator<P> {
    /// Creates an orchestrator over a media processor and a validated config.
    pub fn new(processor: P, config: AppConfig) -> Self {
        Self {
            processor,
            config,
            dry_run: false,
        }
    }

    /// Plans without transcoding or touching files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the effective configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Scans the folder and processes every match.
    ///
    /// The scan is collected up front so outputs written during the run are
    /// not picked up as new candidates.
    pub async fn run(&self, scanner: &FolderScanner) -> BatchSummary {
        let paths: Vec<PathBuf> = scanner.files().collect();
        info!(
            root = ?scanner.root(),
            count = paths.len(),
            mode = %self.config.mode,
            target_mb = self.config.target_size_mb,
            "Found video files"
        );

        self.process_all(paths).await
    }

    /// Processes the given paths in order.
    pub async fn process_all<I>(&self, paths: I) -> BatchSummary
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut summary = BatchSummary::start();

        for path in paths {
            let outcome = self.process_asset(&path).await;
            summary.record(&path, outcome);
        }

        summary.finish();
        info!(
            total = summary.counts.total,
            succeeded = summary.counts.succeeded,
            skipped = summary.counts.skipped,
            failed = summary.counts.failed,
            "Batch finished"
        );
        summary
    }

    /// Processes one asset, turning any error into a failed outcome.
    pub async fn process_asset(&self, path: &Path) -> AssetOutcome {
        self.track_asset(path).await.0
    }

    async fn track_asset(&self, path: &Path) -> (AssetOutcome, AssetTracker) {
        let mut tracker = AssetTracker::new(path);

        let outcome = match self.execute(path, &mut tracker).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracker.transition(AssetState::Failed);
                error!(path = ?path, error = %e, "Asset failed");
                AssetOutcome::from(&e)
            }
        };
        (outcome, tracker)
    }

    /// Measures an asset and plans it, without executing anything.
    ///
    /// Returns no plan when the file is already within budget; its duration is
    /// then left unprobed.
    pub async fn plan_asset(
        &self,
        path: &Path,
    ) -> Result<(MediaAsset, Option<AssetPlan>), AssetError> {
        let asset = self.measure_asset(path).await?;
        let plan = self.plan_measured(&asset)?;
        Ok((asset, plan))
    }

    /// Reads the file size and, only for files over budget, probes the duration.
    pub async fn measure_asset(&self, path: &Path) -> Result<MediaAsset, AssetError> {
        let mut asset = MediaAsset {
            path: path.to_path_buf(),
            size_bytes: measure_size(path)?,
            duration_secs: None,
        };

        if !asset.within_budget(self.config.target_size_mb) {
            let duration = measure_duration(&self.processor, path).await?;
            asset.duration_secs = Some(duration);
        }
        debug!(path = ?path, size_mb = asset.size_mb(), duration = ?asset.duration_secs, "Measured asset");

        Ok(asset)
    }

    /// Plans a measured asset for the configured mode.
    ///
    /// Returns `None` for assets within budget.
    pub fn plan_measured(&self, asset: &MediaAsset) -> Result<Option<AssetPlan>, AssetError> {
        let target_mb = self.config.target_size_mb;
        if asset.within_budget(target_mb) {
            return Ok(None);
        }

        // An over-budget asset without a duration cannot be split or rated.
        let duration = asset.duration_secs.unwrap_or(f64::NAN);
        let plan = match self.config.mode {
            Mode::Segment => planner::segment::plan(asset.size_mb(), duration, target_mb)
                .map(AssetPlan::Segments),
            Mode::Recode => planner::bitrate::plan(duration, target_mb).map(AssetPlan::Recode),
        }
        .map_err(|source| AssetError::Plan {
            path: asset.path.clone(),
            source,
        })?;

        Ok(Some(plan))
    }

    /// Turns a plan into transcode jobs, in plan order.
    pub fn jobs_for(&self, path: &Path, plan: &AssetPlan) -> Vec<TranscodeJob> {
        let params = CodecParams::from_config(&self.config);

        match plan {
            AssetPlan::Segments(segments) => segments
                .iter()
                .map(|segment| TranscodeJob::segment(path, segment, params.clone()))
                .collect(),
            AssetPlan::Recode(bitrate) => vec![TranscodeJob::recode(path, bitrate, params)],
        }
    }

    async fn execute(
        &self,
        path: &Path,
        tracker: &mut AssetTracker,
    ) -> Result<AssetOutcome, AssetError> {
        let asset = self.measure_asset(path).await?;
        tracker.transition(AssetState::Measured);

        let Some(plan) = self.plan_measured(&asset)? else {
            tracker.transition(AssetState::Skipped);
            info!(
                path = ?path,
                size_mb = asset.size_mb(),
                target_mb = self.config.target_size_mb,
                "Already within budget, no action needed"
            );
            return Ok(AssetOutcome::Skipped {
                size_mb: asset.size_mb(),
            });
        };

        tracker.transition(AssetState::Planned);
        let jobs = self.jobs_for(path, &plan);
        info!(
            path = ?path,
            size_mb = asset.size_mb(),
            duration = ?asset.duration_secs,
            jobs = jobs.len(),
            "Planned asset"
        );

        if self.dry_run {
            for job in &jobs {
                info!(path = ?path, job = %job.label(), output = ?job.output, mode = ?job.mode, "Dry run, not transcoding");
            }
            return Ok(AssetOutcome::Planned { jobs: jobs.len() });
        }

        tracker.transition(AssetState::Executing);
        let outputs = match plan {
            AssetPlan::Segments(_) => self.run_segments(path, &jobs).await?,
            AssetPlan::Recode(_) => self.run_recode(path, &jobs).await?,
        };

        tracker.transition(AssetState::Done);
        Ok(AssetOutcome::Succeeded {
            jobs: jobs.len(),
            outputs,
        })
    }

    /// Submits segment jobs in order, stopping at the first failure.
    ///
    /// Segments already written before a failure are left on disk.
    async fn run_segments(
        &self,
        path: &Path,
        jobs: &[TranscodeJob],
    ) -> Result<Vec<PathBuf>, AssetError> {
        let total = jobs.len();
        let mut outputs = Vec::with_capacity(total);

        for (i, job) in jobs.iter().enumerate() {
            info!(path = ?path, job = i + 1, total, output = ?job.output, "Exporting segment");

            self.processor
                .transcode(job)
                .await
                .map_err(|source| AssetError::Job {
                    path: path.to_path_buf(),
                    job: i + 1,
                    total,
                    source,
                })?;

            outputs.push(job.output.clone());
        }

        if self.config.delete_original_after_split && !outputs.is_empty() {
            match std::fs::remove_file(path) {
                Ok(()) => info!(path = ?path, "Deleted original after splitting"),
                Err(e) => warn!(path = ?path, error = %e, "Failed to delete original after splitting"),
            }
        }

        Ok(outputs)
    }

    /// Re-encodes into a temporary sibling and swaps it over the original.
    async fn run_recode(
        &self,
        path: &Path,
        jobs: &[TranscodeJob],
    ) -> Result<Vec<PathBuf>, AssetError> {
        let total = jobs.len();

        for (i, job) in jobs.iter().enumerate() {
            info!(path = ?path, output = ?job.output, mode = ?job.mode, "Re-encoding");

            if let Err(source) = self.processor.transcode(job).await {
                if job.output.exists() {
                    if let Err(e) = std::fs::remove_file(&job.output) {
                        warn!(output = ?job.output, error = %e, "Failed to remove partial output");
                    }
                }
                return Err(AssetError::Job {
                    path: path.to_path_buf(),
                    job: i + 1,
                    total,
                    source,
                });
            }

            replace::replace_in_place(path, &job.output)?;
        }

        Ok(vec![path.to_path_buf()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{JobMode, MockMediaProcessor};
    use crate::error::{EncoderError, PlanError, ProbeError};
    use mockall::Sequence;

    const MB: usize = 1024 * 1024;

    fn write_file(dir: &Path, name: &str, mb: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; mb * MB]).unwrap();
        path
    }

    fn config(mode: Mode) -> AppConfig {
        AppConfig {
            mode,
            ..AppConfig::default()
        }
    }

    fn write_output(job: &TranscodeJob) -> Result<(), EncoderError> {
        std::fs::write(&job.output, b"encoded").unwrap();
        Ok(())
    }

    #[tokio::test]
    async fn small_file_is_skipped_without_probing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "small.mp4", 5);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().never();
        processor.expect_transcode().never();

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(outcome, AssetOutcome::Skipped { size_mb } if size_mb == 5.0));
    }

    #[tokio::test]
    async fn segments_are_submitted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 16);

        let mut processor = MockMediaProcessor::new();
        let probed = path.clone();
        processor
            .expect_probe_duration()
            .withf(move |p| p == probed.as_path())
            .times(1)
            .returning(|_| Ok(120.0));

        let mut seq = Sequence::new();
        for (index, start) in [(1usize, 0.0f64), (2, 40.0), (3, 80.0)] {
            processor
                .expect_transcode()
                .withf(move |job| {
                    job.mode
                        == JobMode::Segment {
                            index,
                            start_secs: start,
                            duration_secs: 40.0,
                        }
                })
                .times(1)
                .in_sequence(&mut seq)
                .returning(write_output);
        }

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));
        let outcome = orchestrator.process_asset(&path).await;

        match outcome {
            AssetOutcome::Succeeded { jobs, outputs } => {
                assert_eq!(jobs, 3);
                assert_eq!(outputs[0], dir.path().join("big_part1.mp4"));
                assert_eq!(outputs[2], dir.path().join("big_part3.mp4"));
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert!(path.exists());
    }

    #[tokio::test]
    async fn failed_segment_aborts_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 16);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(90.0));

        let mut seq = Sequence::new();
        processor
            .expect_transcode()
            .withf(|job| matches!(job.mode, JobMode::Segment { index: 1, .. }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(write_output);
        processor
            .expect_transcode()
            .withf(|job| matches!(job.mode, JobMode::Segment { index: 2, .. }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(EncoderError::FfmpegFailed {
                    code: 1,
                    stderr: "Invalid data found".into(),
                })
            });

        let mut config = config(Mode::Segment);
        config.delete_original_after_split = true;
        let orchestrator = Orchestrator::new(processor, config);
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(
            outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Job,
                job: Some(2),
                ..
            }
        ));
        assert!(path.exists(), "original must survive a failed split");
        assert!(dir.path().join("big_part1.mp4").exists());
    }

    #[tokio::test]
    async fn original_deleted_only_after_full_split() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 9);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(10.0));
        processor.expect_transcode().times(2).returning(write_output);

        let mut config = config(Mode::Segment);
        config.delete_original_after_split = true;
        let orchestrator = Orchestrator::new(processor, config);

        let outcome = orchestrator.process_asset(&path).await;
        assert!(matches!(outcome, AssetOutcome::Succeeded { jobs: 2, .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn recode_replaces_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mkv", 12);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(60.0));
        processor
            .expect_transcode()
            .withf(|job| match job.mode {
                JobMode::Recode { target_video_kbps } => {
                    (target_video_kbps - 8.0 * 8192.0 / 60.0).abs() < 1e-9
                }
                _ => false,
            })
            .times(1)
            .returning(write_output);

        let orchestrator = Orchestrator::new(processor, config(Mode::Recode));
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(outcome, AssetOutcome::Succeeded { jobs: 1, .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"encoded");
        assert!(!dir.path().join("temp_compressed_big.mkv").exists());
    }

    #[tokio::test]
    async fn failed_recode_keeps_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 12);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(60.0));
        processor.expect_transcode().times(1).returning(|job| {
            std::fs::write(&job.output, b"partial").unwrap();
            Err(EncoderError::FfmpegFailed {
                code: 183,
                stderr: "Conversion failed!".into(),
            })
        });

        let orchestrator = Orchestrator::new(processor, config(Mode::Recode));
        let outcome = orchestrator.process_asset(&path).await;

        assert!(outcome.is_failure());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), (12 * MB) as u64);
        assert!(!dir.path().join("temp_compressed_big.mp4").exists());
    }

    #[tokio::test]
    async fn empty_recode_output_is_a_replace_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 12);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(60.0));
        processor.expect_transcode().returning(|job| {
            std::fs::write(&job.output, b"").unwrap();
            Ok(())
        });

        let orchestrator = Orchestrator::new(processor, config(Mode::Recode));
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(
            outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Replace,
                ..
            }
        ));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), (12 * MB) as u64);
        assert!(dir.path().join("temp_compressed_big.mp4").exists());
    }

    #[tokio::test]
    async fn probe_failure_fails_the_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 10);

        let mut processor = MockMediaProcessor::new();
        processor
            .expect_probe_duration()
            .returning(|_| Err(ProbeError::Unparseable { output: "N/A".into() }));
        processor.expect_transcode().never();

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(
            outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Probe,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn zero_duration_cannot_be_planned() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 10);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(0.0));
        processor.expect_transcode().never();

        let orchestrator = Orchestrator::new(processor, config(Mode::Recode));
        let err = orchestrator.plan_asset(&path).await.unwrap_err();

        assert!(matches!(
            err,
            AssetError::Plan {
                source: PlanError::InvalidDuration { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dry_run_plans_without_transcoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 17);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(30.0));
        processor.expect_transcode().never();

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment)).with_dry_run(true);
        let outcome = orchestrator.process_asset(&path).await;

        assert_eq!(outcome, AssetOutcome::Planned { jobs: 3 });
    }

    #[tokio::test]
    async fn missing_file_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let small = write_file(dir.path(), "small.mp4", 1);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().never();

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));
        let summary = orchestrator
            .process_all(vec![dir.path().join("vanished.mp4"), small])
            .await;

        assert_eq!(summary.counts.failed, 1);
        assert_eq!(summary.counts.skipped, 1);
        assert!(matches!(
            summary.assets[0].outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Measure,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn tiny_target_fails_planning_and_keeps_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 2);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(60.0));
        processor.expect_transcode().never();

        let config = AppConfig {
            target_size_mb: 1e-300,
            delete_original_after_split: true,
            ..config(Mode::Segment)
        };
        let orchestrator = Orchestrator::new(processor, config);
        let outcome = orchestrator.process_asset(&path).await;

        assert!(matches!(
            outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Plan,
                ..
            }
        ));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn split_without_outputs_never_deletes_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 1);

        let mut processor = MockMediaProcessor::new();
        processor.expect_transcode().never();

        let config = AppConfig {
            delete_original_after_split: true,
            ..config(Mode::Segment)
        };
        let orchestrator = Orchestrator::new(processor, config);
        let outputs = orchestrator.run_segments(&path, &[]).await.unwrap();

        assert!(outputs.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn probe_failure_never_reaches_measured() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 10);

        let mut processor = MockMediaProcessor::new();
        processor
            .expect_probe_duration()
            .returning(|_| Err(ProbeError::Unparseable { output: "".into() }));

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));
        let (_, tracker) = orchestrator.track_asset(&path).await;

        assert_eq!(tracker.history(), &[AssetState::Discovered, AssetState::Failed]);
    }

    #[tokio::test]
    async fn plan_failure_is_recorded_after_measurement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "big.mp4", 10);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(0.0));

        let orchestrator = Orchestrator::new(processor, config(Mode::Recode));
        let (outcome, tracker) = orchestrator.track_asset(&path).await;

        assert!(matches!(
            outcome,
            AssetOutcome::Failed {
                stage: FailureStage::Plan,
                ..
            }
        ));
        assert_eq!(
            tracker.history(),
            &[AssetState::Discovered, AssetState::Measured, AssetState::Failed]
        );
    }

    #[tokio::test]
    async fn states_follow_the_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let small = write_file(dir.path(), "small.mp4", 1);
        let big = write_file(dir.path(), "big.mp4", 9);

        let mut processor = MockMediaProcessor::new();
        processor.expect_probe_duration().returning(|_| Ok(10.0));
        processor.expect_transcode().times(2).returning(write_output);

        let orchestrator = Orchestrator::new(processor, config(Mode::Segment));

        let (_, skipped) = orchestrator.track_asset(&small).await;
        assert_eq!(
            skipped.history(),
            &[AssetState::Discovered, AssetState::Measured, AssetState::Skipped]
        );

        let (_, done) = orchestrator.track_asset(&big).await;
        assert_eq!(
            done.history(),
            &[
                AssetState::Discovered,
                AssetState::Measured,
                AssetState::Planned,
                AssetState::Executing,
                AssetState::Done,
            ]
        );
        for pair in done.history().windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
        }
    }
}
