//! FFmpeg and ffprobe subprocess wrappers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::job::{JobMode, TranscodeJob};
use super::MediaProcessor;
use crate::config::model::ToolsConfig;
use crate::error::{EncoderError, ProbeError};
use crate::media::probe::parse_duration;
use crate::planner::BitratePlan;

/// Number of stderr lines kept in error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Runs jobs through the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegProcessor {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegProcessor {
    /// Creates a processor using the configured tool paths.
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
        }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProbeError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ProbeError::ProbeFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: tail(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<(), EncoderError> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(build_args(job));

        debug!(cmd = ?cmd, "Running FFmpeg");

        let output_result = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| EncoderError::SpawnFailed(e.to_string()))?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(EncoderError::FfmpegFailed {
                code: output_result.status.code().unwrap_or(-1),
                stderr: tail(&stderr),
            });
        }

        verify_output(&job.output)?;

        info!(output = ?job.output, job = %job.label(), "Transcode completed");
        Ok(())
    }
}

/// Builds the ffmpeg argument list for a job.
pub fn build_args(job: &TranscodeJob) -> Vec<OsString> {
    let codec = job.params.video_codec.ffmpeg_name().to_string();

    let mut encode: Vec<String> = match job.mode {
        // Full precision, no keyframe alignment.
        JobMode::Segment {
            start_secs,
            duration_secs,
            ..
        } => vec![
            "-ss".into(),
            start_secs.to_string(),
            "-t".into(),
            duration_secs.to_string(),
            "-c:v".into(),
            codec,
        ],
        JobMode::Recode { target_video_kbps } => vec![
            "-b:v".into(),
            BitratePlan { target_video_kbps }.ffmpeg_value(),
            "-c:v".into(),
            codec,
            "-crf".into(),
            job.params.crf.to_string(),
        ],
    };

    if let Some(preset) = &job.params.preset {
        encode.push("-preset".into());
        encode.push(preset.clone());
    }

    encode.push("-c:a".into());
    encode.push(job.params.audio_codec.clone());
    encode.push("-b:a".into());
    encode.push(job.params.audio_bitrate.clone());

    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-nostdin", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(job.input.clone().into_os_string());
    args.extend(encode.into_iter().map(OsString::from));
    args.push(job.output.clone().into_os_string());

    args
}

/// Confirms the encoder left a non-empty output behind.
pub fn verify_output(path: &Path) -> Result<(), EncoderError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(EncoderError::EmptyOutput {
            path: path.to_path_buf(),
        }),
        Err(_) => Err(EncoderError::MissingOutput {
            path: path.to_path_buf(),
        }),
    }
}

/// Keeps the last lines of tool output, where ffmpeg reports the actual failure.
fn tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::AppConfig;
    use crate::encoder::job::CodecParams;
    use crate::planner::Segment;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn segment_args_carry_full_precision_offsets() {
        let segment = Segment {
            index: 2,
            start_secs: 33.333333333333336,
            duration_secs: 33.333333333333336,
        };
        let params = CodecParams::from_config(&AppConfig::default());
        let job = TranscodeJob::segment(Path::new("/v/in.mp4"), &segment, params);

        let args = as_strings(&build_args(&job));
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-nostdin", "-i", "/v/in.mp4",
                "-ss", "33.333333333333336", "-t", "33.333333333333336",
                "-c:v", "libx264", "-preset", "medium",
                "-c:a", "aac", "-b:a", "128k",
                "/v/in_part2.mp4",
            ]
        );
    }

    #[test]
    fn recode_args_request_bitrate_and_crf() {
        let plan = BitratePlan {
            target_video_kbps: 1092.2666666,
        };
        let params = CodecParams::from_config(&AppConfig::default());
        let job = TranscodeJob::recode(Path::new("/v/in.mkv"), &plan, params);

        let args = as_strings(&build_args(&job));
        let bv = args.iter().position(|a| a == "-b:v").unwrap();
        assert_eq!(args[bv + 1], "1092.27k");
        let crf = args.iter().position(|a| a == "-crf").unwrap();
        assert_eq!(args[crf + 1], "23");
        assert!(!args.contains(&"-ss".to_string()));
        assert_eq!(args.last().unwrap(), "/v/temp_compressed_in.mkv");
    }

    #[test]
    fn bitrate_argument_never_rounds_to_zero() {
        let plan = BitratePlan {
            target_video_kbps: 0.001,
        };
        let job = TranscodeJob::recode(
            Path::new("/v/long.mp4"),
            &plan,
            CodecParams::from_config(&AppConfig::default()),
        );

        let args = as_strings(&build_args(&job));
        let bv = args.iter().position(|a| a == "-b:v").unwrap();
        assert_eq!(args[bv + 1], "1.00k");
    }

    #[test]
    fn vp9_has_no_preset() {
        let mut config = AppConfig::default();
        config.codec = crate::config::VideoCodec::Vp9;
        let plan = BitratePlan {
            target_video_kbps: 500.0,
        };
        let job = TranscodeJob::recode(Path::new("in.mp4"), &plan, CodecParams::from_config(&config));

        let args = as_strings(&build_args(&job));
        assert!(args.contains(&"libvpx-vp9".to_string()));
        assert!(!args.contains(&"-preset".to_string()));
    }

    #[test]
    fn verify_output_rejects_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        assert!(matches!(
            verify_output(&path),
            Err(EncoderError::MissingOutput { .. })
        ));

        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            verify_output(&path),
            Err(EncoderError::EmptyOutput { .. })
        ));

        std::fs::write(&path, b"data").unwrap();
        assert!(verify_output(&path).is_ok());
    }

    #[test]
    fn tail_keeps_last_lines() {
        let output: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let kept = tail(&output);
        assert!(kept.starts_with("line 30"));
        assert!(kept.ends_with("line 49"));
    }
}
