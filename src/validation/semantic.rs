//! Semantic validation for configuration values.

use crate::config::model::AppConfig;

use super::{ValidationIssue, ValidationResult};

/// Presets understood by x264 and x265.
const VALID_PRESETS: &[&str] = &[
    "ultrafast", "superfast", "veryfast", "faster", "fast", "medium", "slow", "slower",
    "veryslow", "placebo",
];

/// Smallest budget accepted, 1 KiB.
pub const MIN_TARGET_SIZE_MB: f64 = 1.0 / 1024.0;

/// Validates semantic correctness of configuration values.
pub fn validate(config: &AppConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_target_size(config.target_size_mb, &mut result);
    validate_log_level(&config.log_level, &mut result);

    if config.audio.codec.trim().is_empty() {
        result.add(
            ValidationIssue::error("audio.codec", "Audio codec cannot be empty")
                .with_suggestion("Use 'aac' for MP4 output"),
        );
    }

    if parse_bitrate_kbps(&config.audio.bitrate).is_none() {
        result.add(
            ValidationIssue::error(
                "audio.bitrate",
                format!("Invalid audio bitrate: '{}'", config.audio.bitrate),
            )
            .with_suggestion("Use a number with an optional k/M suffix, e.g. '128k'"),
        );
    }

    let max_crf = config.codec.max_crf();
    if config.encoder.crf > max_crf {
        result.add(ValidationIssue::error(
            "encoder.crf",
            format!(
                "CRF {} is out of range for {} (0-{})",
                config.encoder.crf, config.codec, max_crf
            ),
        ));
    }

    if config.codec.supports_preset() && !VALID_PRESETS.contains(&config.encoder.preset.as_str()) {
        result.add(
            ValidationIssue::warning(
                "encoder.preset",
                format!("Unknown preset: '{}'", config.encoder.preset),
            )
            .with_suggestion(format!("Valid presets: {}", VALID_PRESETS.join(", "))),
        );
    }

    if config.delete_original_after_split && config.mode != crate::config::Mode::Segment {
        result.add(ValidationIssue::warning(
            "delete_original_after_split",
            "Only applies in segment mode and will be ignored",
        ));
    }

    result
}

fn validate_target_size(target_size_mb: f64, result: &mut ValidationResult) {
    if !target_size_mb.is_finite() || target_size_mb <= 0.0 {
        result.add(
            ValidationIssue::error(
                "target_size_mb",
                format!("Target size must be a positive number, got {}", target_size_mb),
            )
            .with_suggestion("The default budget is 8 MB"),
        );
    } else if target_size_mb < MIN_TARGET_SIZE_MB {
        result.add(
            ValidationIssue::error(
                "target_size_mb",
                format!(
                    "Target size {} MB is below the {} MB minimum",
                    target_size_mb, MIN_TARGET_SIZE_MB
                ),
            )
            .with_suggestion("No video fits in less than a kilobyte"),
        );
    } else if target_size_mb < 1.0 {
        result.add(ValidationIssue::warning(
            "target_size_mb",
            format!(
                "Target size {} MB is very small; audio alone may exceed it",
                target_size_mb
            ),
        ));
    }
}

fn validate_log_level(level: &str, result: &mut ValidationResult) {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&level) {
        result.add(
            ValidationIssue::error("log_level", format!("Invalid log level: '{}'", level))
                .with_suggestion(format!("Valid levels: {}", valid_levels.join(", "))),
        );
    }
}

/// Parses an ffmpeg style bitrate ("128k", "1.5M", "96000") into kbps.
pub fn parse_bitrate_kbps(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, scale) = match value.chars().last()? {
        'k' | 'K' => (&value[..value.len() - 1], 1.0),
        'm' | 'M' => (&value[..value.len() - 1], 1000.0),
        _ => (value, 0.001),
    };

    let parsed: f64 = number.parse().ok()?;
    if parsed.is_finite() && parsed > 0.0 {
        Some(parsed * scale)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, VideoCodec};

    #[test]
    fn default_config_is_clean() {
        let result = validate(&AppConfig::default());
        assert!(result.is_valid());
        assert_eq!(result.warnings().count(), 0);
    }

    #[test]
    fn non_positive_target_is_an_error() {
        for target in [0.0, -4.0, f64::NAN] {
            let config = AppConfig {
                target_size_mb: target,
                ..AppConfig::default()
            };
            let result = validate(&config);
            assert!(result.errors().any(|i| i.path == "target_size_mb"));
        }
    }

    #[test]
    fn sub_kilobyte_target_is_an_error() {
        for target in [1e-300, f64::MIN_POSITIVE, 1e-6, MIN_TARGET_SIZE_MB / 2.0] {
            let config = AppConfig {
                target_size_mb: target,
                ..AppConfig::default()
            };
            let result = validate(&config);
            assert!(!result.is_valid(), "accepted {target}");
            assert!(result.errors().any(|i| i.path == "target_size_mb"));
        }
    }

    #[test]
    fn small_target_is_only_a_warning() {
        let config = AppConfig {
            target_size_mb: 0.5,
            ..AppConfig::default()
        };
        let result = validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings().any(|i| i.path == "target_size_mb"));
    }

    #[test]
    fn crf_range_depends_on_codec() {
        let mut config = AppConfig::default();
        config.encoder.crf = 60;
        assert!(!validate(&config).is_valid());

        config.codec = VideoCodec::Vp9;
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn preset_ignored_for_vp9() {
        let mut config = AppConfig::default();
        config.encoder.preset = "good".to_string();
        assert_eq!(validate(&config).warnings().count(), 1);

        config.codec = VideoCodec::Vp9;
        assert_eq!(validate(&config).warnings().count(), 0);
    }

    #[test]
    fn delete_original_warns_outside_segment_mode() {
        let config = AppConfig {
            mode: Mode::Recode,
            delete_original_after_split: true,
            ..AppConfig::default()
        };
        let result = validate(&config);
        assert!(result.warnings().any(|i| i.path == "delete_original_after_split"));
    }

    #[test]
    fn bitrate_parsing() {
        assert_eq!(parse_bitrate_kbps("128k"), Some(128.0));
        assert_eq!(parse_bitrate_kbps("1.5M"), Some(1500.0));
        assert_eq!(parse_bitrate_kbps("96000"), Some(96.0));
        assert_eq!(parse_bitrate_kbps("fast"), None);
        assert_eq!(parse_bitrate_kbps(""), None);
        assert_eq!(parse_bitrate_kbps("-64k"), None);
    }
}
