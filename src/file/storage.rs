//! Blob storage for docvault.
//!
//! File records reference their content by an opaque key. [`BlobStore`] is
//! the seam between the managers and whatever holds the bytes;
//! [`FileStorage`] keeps them on the local filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{Result, VaultError};

/// Persists binary content keyed by an opaque string.
pub trait BlobStore: Send + Sync {
    /// Store content and return the generated key.
    ///
    /// `suggested_name` only contributes its extension to the key.
    fn store(&self, content: &[u8], suggested_name: &str) -> Result<String>;

    /// Read the full content of a blob.
    fn load(&self, key: &str) -> Result<Vec<u8>>;

    /// Byte length of a blob. Missing blobs fail with `NotFound`.
    fn size_of(&self, key: &str) -> Result<u64>;

    /// Remove a blob. Returns `false` if it was already absent.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Whether a blob exists.
    fn exists(&self, key: &str) -> bool;
}

/// Filesystem blob store.
///
/// Keys are `<uuid>.<ext>` and live in shard directories named after the
/// first two characters of the key:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.pdf
/// └── cd/
///     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full path for a key: `{base_path}/{shard}/{key}`.
    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        let shard = key.get(..2).unwrap_or(key);
        Ok(self.base_path.join(shard).join(key))
    }
}

impl BlobStore for FileStorage {
    fn store(&self, content: &[u8], suggested_name: &str) -> Result<String> {
        let key = generate_key(suggested_name);
        let path = self.blob_path(&key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;

        Ok(key)
    }

    fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(key)?;
        fs::read(&path).map_err(|e| not_found_or_io(e, key))
    }

    fn size_of(&self, key: &str) -> Result<u64> {
        let path = self.blob_path(key)?;
        fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| not_found_or_io(e, key))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> bool {
        self.blob_path(key).map(|p| p.is_file()).unwrap_or(false)
    }
}

fn not_found_or_io(e: io::Error, key: &str) -> VaultError {
    if e.kind() == io::ErrorKind::NotFound {
        VaultError::NotFound(format!("blob {key}"))
    } else {
        e.into()
    }
}

/// Reject keys that could escape the storage root.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(VaultError::Validation(format!("invalid blob key: {key:?}")));
    }
    Ok(())
}

/// Lowercased extension of a file name, "bin" when there is none.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

fn generate_key(suggested_name: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension_of(suggested_name))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A store whose reads and deletes always fail, for exercising the
    /// best-effort paths.
    pub struct BrokenStore {
        pub inner: FileStorage,
    }

    impl BlobStore for BrokenStore {
        fn store(&self, content: &[u8], suggested_name: &str) -> Result<String> {
            self.inner.store(content, suggested_name)
        }

        fn load(&self, _key: &str) -> Result<Vec<u8>> {
            Err(VaultError::Storage("device unavailable".to_string()))
        }

        fn size_of(&self, _key: &str) -> Result<u64> {
            Err(VaultError::Storage("device unavailable".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<bool> {
            Err(VaultError::Storage("device unavailable".to_string()))
        }

        fn exists(&self, key: &str) -> bool {
            self.inner.exists(key)
        }
    }
}
