//! board-storage - Storage library for painboard
//!
//! File-backed implementations of the backing store and the local vote
//! history.

mod file_store;
mod history;

pub use file_store::{FileSystemStore, CURRENT_SCHEMA_VERSION};
pub use history::FileVoteHistory;

use std::path::PathBuf;

/// Platform data directory for painboard (`~/.painboard` as a fallback)
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "painboard", "painboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".painboard")
        })
}
