//! Revisioned content storage.
//!
//! The override document lives in some store addressed by path, where every
//! version of a file carries an opaque revision token. Writes may be made
//! conditional on the revision the writer last saw; this is the only
//! concurrency primitive the persister relies on.

mod fs;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use fs::{FileSystemStore, compute_version};
pub use memory::InMemoryContentStore;

/// A file's content together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub revision: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The file changed between the caller's read and its conditional write.
    #[error("{path} was modified concurrently (expected revision {}, found {})", describe(.expected), describe(.actual))]
    Conflict {
        path: String,
        expected: Option<String>,
        actual: Option<String>,
    },
    #[error("content store failure: {0}")]
    Backend(String),
}

fn describe(revision: &Option<String>) -> &str {
    revision.as_deref().unwrap_or("<absent>")
}

/// Path-addressed storage with optimistic concurrency.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Reads a file; `Ok(None)` when it does not exist.
    async fn fetch_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Current revision of a file without keeping its content.
    async fn fetch_revision(&self, path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.fetch_file(path).await?.map(|file| file.revision))
    }

    /// Writes `content` and returns the new revision.
    ///
    /// With `expected_revision` the write only succeeds if the file is still at
    /// that revision. Without it the write creates the file and fails if one
    /// already exists. Either failure is [`StoreError::Conflict`].
    async fn write_file(&self, path: &str, content: &str, expected_revision: Option<&str>) -> Result<String, StoreError>;
}

/// Shared check for stores that can compare revisions locally.
pub(crate) fn check_revision(path: &str, expected: Option<&str>, actual: Option<&str>) -> Result<(), StoreError> {
    if expected == actual {
        return Ok(());
    }
    Err(StoreError::Conflict {
        path: path.to_string(),
        expected: expected.map(str::to_string),
        actual: actual.map(str::to_string),
    })
}
