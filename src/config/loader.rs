//! Configuration file loading and parsing.

use std::path::Path;

use anyhow::Result;

use super::model::AppConfig;
use crate::error::ConfigError;
use crate::validation::report::format_report;
use crate::validation::ValidationResult;

/// Loads the configuration file from disk and parses it.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: AppConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(config)
}

/// Loads the configuration file if one was given, otherwise returns the defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => Ok(AppConfig::default()),
    }
}

/// Logs validation warnings and rejects results that contain errors.
///
/// `root` is the folder about to be processed, named in the error report.
pub fn enforce(result: &ValidationResult, root: Option<&Path>) -> Result<()> {
    for issue in result.warnings() {
        tracing::warn!(
            path = %issue.path,
            message = %issue.message,
            suggestion = ?issue.suggestion,
            "Config validation warning"
        );
    }

    let error_count = result.error_count();
    if error_count > 0 {
        tracing::error!("{}", format_report(result, root));
        anyhow::bail!(ConfigError::ValidationFailed { error_count });
    }

    Ok(())
}
