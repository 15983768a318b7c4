//! Directory enumeration of candidate video files.

pub mod folder;

pub use folder::{is_video_file, FolderScanner, VIDEO_EXTENSIONS};
