//! Pre-flight report shown before a batch starts.

use std::collections::BTreeMap;
use std::path::Path;

use super::{ValidationIssue, ValidationResult, ValidationSeverity};

/// Part of the setup an issue belongs to, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    RootFolder,
    Budget,
    Encoders,
    Encoding,
    Logging,
}

impl Section {
    fn of(path: &str) -> Self {
        match path {
            "root" => Self::RootFolder,
            "target_size_mb" | "mode" | "delete_original_after_split" => Self::Budget,
            "codec" | "audio.codec" => Self::Encoders,
            "log_level" => Self::Logging,
            p if p.starts_with("tools.") => Self::Encoders,
            _ => Self::Encoding,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::RootFolder => "Root folder",
            Self::Budget => "Size budget",
            Self::Encoders => "ffmpeg encoders",
            Self::Encoding => "Encoding settings",
            Self::Logging => "Logging",
        }
    }
}

/// Renders the pre-flight report, grouped by the part of the setup at fault.
///
/// `root` names the folder about to be processed, when there is one.
pub fn format_report(result: &ValidationResult, root: Option<&Path>) -> String {
    let error_count = result.error_count();
    let warning_count = result.warnings().count();
    let target = match root {
        Some(root) => format!(" for '{}'", root.display()),
        None => String::new(),
    };

    if error_count == 0 && warning_count == 0 {
        return format!("Pre-flight check{} passed.", target);
    }

    let mut sections: BTreeMap<Section, Vec<&ValidationIssue>> = BTreeMap::new();
    for issue in result.errors().chain(result.warnings()) {
        sections.entry(Section::of(&issue.path)).or_default().push(issue);
    }

    let verdict = if error_count > 0 { "failed" } else { "passed with warnings" };
    let mut report = format!("Pre-flight check{} {}\n", target, verdict);

    for (section, issues) in &sections {
        report.push_str(&format!("\n{}\n", section.title()));
        for issue in issues {
            report.push_str(&format_issue(issue));
        }
    }

    report.push_str(&format!(
        "\n{} error(s), {} warning(s)\n",
        error_count, warning_count
    ));
    if error_count > 0 {
        report.push_str("Run aborted. No files were touched.\n");
    }

    report
}

fn format_issue(issue: &ValidationIssue) -> String {
    let label = match issue.severity {
        ValidationSeverity::Error => "error",
        ValidationSeverity::Warning => "warn ",
    };

    let mut line = format!("  {} {}: {}\n", label, issue.path, issue.message);
    if let Some(suggestion) = &issue.suggestion {
        line.push_str(&format!("        hint: {}\n", suggestion));
    }
    line
}
