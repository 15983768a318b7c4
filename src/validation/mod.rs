//! Configuration validation system.

pub mod codec;
pub mod paths;
pub mod report;
pub mod semantic;

use std::collections::HashSet;
use std::path::Path;

use crate::config::model::AppConfig;
use crate::error::CapabilityError;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Blocks the run.
    Error,
    /// Logged but allows the run.
    Warning,
}

/// A validation issue found during configuration checking.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: ValidationSeverity,
    /// Path to the problematic config field (e.g., "audio.bitrate").
    pub path: String,
    /// Description of the issue.
    pub message: String,
    /// Optional suggestion for fixing the issue.
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new error-level validation issue.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Creates a new warning-level validation issue.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to this validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of validating a configuration.
#[derive(Debug, Default)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Creates an empty validation result.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the result.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Extends the result with issues from another result.
    pub fn extend(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// Returns true if there are no errors (warnings are allowed).
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == ValidationSeverity::Error)
    }

    /// Returns an iterator over error-level issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
    }

    /// Returns an iterator over warning-level issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Returns the number of errors.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// Encoders the local ffmpeg build provides.
#[derive(Debug, Clone, Default)]
pub struct SystemCapabilities {
    /// Available FFmpeg encoders.
    pub available_encoders: HashSet<String>,
}

impl SystemCapabilities {
    /// Detects system capabilities by querying ffmpeg and checking for ffprobe.
    pub fn detect(ffmpeg: &Path, ffprobe: &Path) -> Result<Self, CapabilityError> {
        let available_encoders = detect_ffmpeg_encoders(ffmpeg)?;
        check_tool_runs(ffprobe)?;

        Ok(Self { available_encoders })
    }

    /// Builds capabilities from a known encoder list.
    pub fn with_encoders<I, S>(encoders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available_encoders: encoders.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if ffmpeg can encode with the named encoder.
    pub fn has_encoder(&self, name: &str) -> bool {
        self.available_encoders.contains(name)
    }
}

/// Detects available FFmpeg encoders by parsing `ffmpeg -encoders`.
fn detect_ffmpeg_encoders(ffmpeg: &Path) -> Result<HashSet<String>, CapabilityError> {
    let command = format!("{} -encoders", ffmpeg.display());
    let output = std::process::Command::new(ffmpeg)
        .args(["-encoders", "-hide_banner"])
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CapabilityError::ToolNotFound {
                tool: ffmpeg.display().to_string(),
            },
            _ => CapabilityError::CommandFailed {
                command: command.clone(),
                message: e.to_string(),
            },
        })?;

    if !output.status.success() {
        return Err(CapabilityError::CommandFailed {
            command,
            message: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ffmpeg_codec_list(&stdout))
}

/// Checks that a tool can be launched at all.
fn check_tool_runs(tool: &Path) -> Result<(), CapabilityError> {
    std::process::Command::new(tool)
        .args(["-version", "-hide_banner"])
        .output()
        .map(|_| ())
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CapabilityError::ToolNotFound {
                tool: tool.display().to_string(),
            },
            _ => CapabilityError::CommandFailed {
                command: format!("{} -version", tool.display()),
                message: e.to_string(),
            },
        })
}

/// Parses FFmpeg encoder list output into a set of codec names.
fn parse_ffmpeg_codec_list(output: &str) -> HashSet<String> {
    let mut codecs = HashSet::new();
    let mut in_list = false;

    for line in output.lines() {
        // Lines look like: " V....D libx264              libx264 H.264 / AVC"
        let trimmed = line.trim();
        if trimmed.starts_with("------") {
            in_list = true;
            continue;
        }
        if !in_list || trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() >= 2 {
            codecs.insert(parts[1].to_string());
        }
    }

    codecs
}

/// Validates the configuration against system capabilities.
pub fn validate_config(config: &AppConfig, capabilities: &SystemCapabilities) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.extend(semantic::validate(config));
    result.extend(codec::validate(config, capabilities));

    result
}
