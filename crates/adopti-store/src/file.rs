//! File-backed client storage.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, instrument, trace};

use adopti_core::error::StorageError;
use adopti_core::{ClientStorage, Result, StorageKey};

use crate::document::Document;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Client storage persisted as a single JSON document.
///
/// Every operation takes an exclusive lock on a sibling `.lock` file,
/// reads the document, and for writes replaces it atomically through a
/// temporary file. Separate processes sharing the file therefore never
/// see a torn write; concurrent writers still resolve as last writer wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use the document at `path`. Nothing is created until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn lock(&self) -> std::result::Result<File, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }

    fn read_document(&self) -> std::result::Result<Document, StorageError> {
        if !self.path.exists() {
            return Ok(Document::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Document::default());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    fn write_document(&self, doc: &Document) -> std::result::Result<(), StorageError> {
        let content = serde_json::to_string_pretty(doc).map_err(|e| StorageError::Corrupt {
            reason: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &content)?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&temp_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }

        fs::rename(&temp_path, &self.path)?;
        trace!(path = %self.path.display(), "Wrote storage document");
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let lock_file = self.lock()?;
        let doc = self.read_document()?;
        let out = f(&doc);
        lock_file.unlock().map_err(StorageError::from)?;
        Ok(out)
    }

    fn update(&self, f: impl FnOnce(&mut Document)) -> Result<()> {
        let lock_file = self.lock()?;
        let mut doc = self.read_document()?;
        f(&mut doc);
        doc.purge_expired(Utc::now());
        self.write_document(&doc)?;
        lock_file.unlock().map_err(StorageError::from)?;
        Ok(())
    }

    /// Delete the document and its lock file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn destroy(&self) -> Result<()> {
        for path in [self.path.clone(), self.lock_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(StorageError::from)?;
            }
        }
        debug!("Removed storage file");
        Ok(())
    }
}

#[async_trait]
impl ClientStorage for FileStorage {
    async fn get(&self, key: StorageKey) -> Result<Option<String>> {
        self.read(|doc| doc.get(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.update(|doc| doc.set(key, value))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: StorageKey) -> Result<()> {
        self.update(|doc| doc.remove(key))
    }

    async fn cookie(&self, name: &str) -> Result<Option<String>> {
        self.read(|doc| doc.cookie(name, Utc::now()))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set_cookie(&self, name: &str, value: &str, max_age: Option<Duration>) -> Result<()> {
        self.update(|doc| doc.set_cookie(name, value, max_age, Utc::now()))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn expire_cookie(&self, name: &str) -> Result<()> {
        self.update(|doc| doc.expire_cookie(name))
    }
}
