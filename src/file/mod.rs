//! Folder and file management for docvault.
//!
//! This module provides:
//! - Blob storage behind the [`BlobStore`] trait
//! - Upload classes with per-class extension allow-lists
//! - Folder and file record repositories
//! - The file lifecycle manager ([`FileService`]) and folder manager
//!   ([`FolderService`])
//! - Human-readable size formatting

mod folder;
mod folder_service;
mod metadata;
mod service;
mod size;
mod storage;
mod upload;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use folder_service::{FolderDeleteOutcome, FolderService};
pub use metadata::{FileRecord, FileRepository, NewFile};
pub use service::{DeleteOutcome, FileService, UploadRequest};
pub use size::{humanize_size, humanize_size_with, SizeLadder, SizeSummary};
pub use storage::{extension_of, BlobStore, FileStorage};
pub use upload::UploadClass;

#[cfg(test)]
pub(crate) use storage::test_support;

/// Maximum length for a file name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length for a folder name (in characters).
pub const MAX_FOLDER_NAME_LENGTH: usize = 100;

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of entries returned by the recent-files view.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;
