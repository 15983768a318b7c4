//! Scanning a single root folder.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ScanError;

/// Extensions recognized as video files, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];

/// Enumerates video files below a root folder.
#[derive(Debug, Clone)]
pub struct FolderScanner {
    /// Folder to scan.
    root: PathBuf,
    /// Whether to descend into subdirectories.
    recursive: bool,
}

impl FolderScanner {
    /// Creates a scanner, checking that the root is a directory.
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Result<Self, ScanError> {
        let root = root.into();

        if !root.exists() {
            return Err(ScanError::RootNotFound { path: root });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        Ok(Self { root, recursive })
    }

    /// Returns the scanned root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yields matching files in file-name order.
    ///
    /// Unreadable entries are logged and skipped. The iterator is finite and
    /// cannot be restarted; call `files` again for a fresh scan.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> {
        let walker = if self.recursive {
            WalkDir::new(&self.root)
        } else {
            WalkDir::new(&self.root).max_depth(1)
        };

        walker
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                let matched = is_video_file(path);
                if !matched {
                    debug!(?path, "Ignoring non-video file");
                }
                matched
            })
    }
}

/// Checks if a path has one of the recognized video extensions.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
