//! Upload classes and their extension allow-lists.

use std::fmt;
use std::path::Path;

use crate::{Result, VaultError};

/// The kind of upload being made. Each class has a fixed extension allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadClass {
    /// Profile pictures: images only.
    ProfilePicture,
    /// Folder files and confidential files: images and office documents.
    FolderFile,
}

const PROFILE_PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const FOLDER_FILE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "docx", "pdf", "ppt", "xls"];

impl UploadClass {
    /// Allowed extensions, lowercase, without the dot.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadClass::ProfilePicture => PROFILE_PICTURE_EXTENSIONS,
            UploadClass::FolderFile => FOLDER_FILE_EXTENSIONS,
        }
    }

    /// Check a file name against the allow-list (case-insensitive).
    ///
    /// Fails with `Validation` when the extension is missing or not allowed.
    pub fn validate(&self, file_name: &str) -> Result<()> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext {
            Some(ext) if self.allowed_extensions().contains(&ext.as_str()) => Ok(()),
            Some(ext) => Err(VaultError::Validation(format!(
                "file extension \"{ext}\" is not allowed for {self}; allowed extensions are: {}",
                self.allowed_extensions().join(", ")
            ))),
            None => Err(VaultError::Validation(format!(
                "file \"{file_name}\" has no extension; allowed extensions for {self} are: {}",
                self.allowed_extensions().join(", ")
            ))),
        }
    }
}

impl fmt::Display for UploadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadClass::ProfilePicture => write!(f, "profile pictures"),
            UploadClass::FolderFile => write!(f, "folder files"),
        }
    }
}
