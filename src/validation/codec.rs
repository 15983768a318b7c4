//! Codec availability validation.

use crate::config::model::AppConfig;

use super::{SystemCapabilities, ValidationIssue, ValidationResult};

/// Video encoders this tool knows how to drive.
const SUPPORTED_VIDEO_ENCODERS: &[&str] = &["libx264", "libx265", "libvpx-vp9"];

/// Validates that the requested codecs are available in the local ffmpeg build.
pub fn validate(config: &AppConfig, capabilities: &SystemCapabilities) -> ValidationResult {
    let mut result = ValidationResult::new();

    let video = config.codec.ffmpeg_name();
    if !capabilities.has_encoder(video) {
        result.add(
            ValidationIssue::error("codec", format!("Video encoder '{}' is not available", video))
                .with_suggestion(suggest_video_encoder(capabilities)),
        );
    }

    let audio = normalize_codec_name(&config.audio.codec);
    if !audio.is_empty() && !capabilities.has_encoder(&audio) {
        result.add(
            ValidationIssue::error(
                "audio.codec",
                format!("Audio codec '{}' is not available", config.audio.codec),
            )
            .with_suggestion(suggest_audio_codec(capabilities)),
        );
    }

    result
}

/// Normalizes codec names to FFmpeg encoder names.
pub fn normalize_codec_name(codec: &str) -> String {
    match codec.trim().to_lowercase().as_str() {
        "opus" => "libopus".to_string(),
        "mp3" => "libmp3lame".to_string(),
        "vorbis" => "libvorbis".to_string(),
        other => other.to_string(),
    }
}

fn suggest_video_encoder(capabilities: &SystemCapabilities) -> String {
    let available: Vec<&str> = SUPPORTED_VIDEO_ENCODERS
        .iter()
        .filter(|c| capabilities.has_encoder(c))
        .copied()
        .collect();

    if available.is_empty() {
        "No supported video encoders available; install an ffmpeg build with libx264".to_string()
    } else {
        format!("Available alternatives: {}", available.join(", "))
    }
}

fn suggest_audio_codec(capabilities: &SystemCapabilities) -> String {
    let common_codecs = ["aac", "libopus", "ac3", "libmp3lame"];

    let available: Vec<&str> = common_codecs
        .iter()
        .filter(|c| capabilities.has_encoder(c))
        .copied()
        .collect();

    if available.is_empty() {
        "No common audio encoders available".to_string()
    } else {
        format!("Available alternatives: {}", available.join(", "))
    }
}
