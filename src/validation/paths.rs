//! Path validation for the scan root.

use std::path::Path;

use super::{ValidationIssue, ValidationResult};

/// Validates that the root folder exists and can be listed.
pub fn validate_root(root: &Path) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !root.exists() {
        result.add(
            ValidationIssue::error(
                "root",
                format!("Directory does not exist: '{}'", root.display()),
            )
            .with_suggestion("Check the folder path"),
        );
        return result;
    }

    if !root.is_dir() {
        result.add(
            ValidationIssue::error(
                "root",
                format!("Path is not a directory: '{}'", root.display()),
            )
            .with_suggestion("Use the `plan` command to inspect a single file"),
        );
        return result;
    }

    if std::fs::read_dir(root).is_err() {
        result.add(
            ValidationIssue::error(
                "root",
                format!("Directory is not readable: '{}'", root.display()),
            )
            .with_suggestion("Check directory permissions"),
        );
        return result;
    }

    if !is_writable(root) {
        result.add(
            ValidationIssue::warning(
                "root",
                format!("Directory may not be writable: '{}'", root.display()),
            )
            .with_suggestion("Outputs are written next to their source files"),
        );
    }

    result
}

fn is_writable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
