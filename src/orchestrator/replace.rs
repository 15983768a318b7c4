//! Replace-in-place of an original file by its re-encoded version.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::AssetError;

/// Moves `replacement` over `original`.
///
/// The replacement must exist and be non-empty before the original is touched.
/// On any failure the original is left in place (or restored) and the
/// replacement is kept for manual recovery.
pub fn replace_in_place(original: &Path, replacement: &Path) -> Result<(), AssetError> {
    replace_with(original, replacement, |from, to| std::fs::rename(from, to))
}

fn replace_with<R>(original: &Path, replacement: &Path, rename: R) -> Result<(), AssetError>
where
    R: Fn(&Path, &Path) -> std::io::Result<()>,
{
    let fail = |message: String| AssetError::Replace {
        path: original.to_path_buf(),
        temp_output: replacement.to_path_buf(),
        message,
    };

    match std::fs::metadata(replacement) {
        Ok(meta) if meta.len() > 0 => {}
        Ok(_) => return Err(fail("replacement output is empty".to_string())),
        Err(e) => return Err(fail(format!("replacement output is unreadable: {}", e))),
    }

    // Atomic overwrite where the platform supports it.
    match rename(replacement, original) {
        Ok(()) => {
            info!(path = ?original, "Replaced original with re-encoded file");
            return Ok(());
        }
        Err(e) => {
            debug!(error = %e, "Direct rename failed, falling back to backup swap");
        }
    }

    let backup = backup_path(original);
    rename(original, &backup)
        .map_err(|e| fail(format!("failed to move original aside: {}", e)))?;

    if let Err(e) = rename(replacement, original) {
        return match rename(&backup, original) {
            Ok(()) => Err(fail(format!("failed to move replacement into place: {}", e))),
            Err(restore) => Err(fail(format!(
                "failed to move replacement into place ({}); original kept at '{}' ({})",
                e,
                backup.display(),
                restore
            ))),
        };
    }

    if let Err(e) = std::fs::remove_file(&backup) {
        warn!(backup = ?backup, error = %e, "Failed to remove backup of original");
    }

    info!(path = ?original, "Replaced original with re-encoded file");
    Ok(())
}

/// `<dir>/<filename>.orig`
fn backup_path(original: &Path) -> PathBuf {
    let mut name = original
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("original"));
    name.push(".orig");
    original.with_file_name(name)
}
