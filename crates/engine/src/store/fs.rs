use std::collections::hash_map::DefaultHasher;
use std::ffi::OsString;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ContentStore, StoreError, StoredFile, check_revision};

/// Content hash used as the revision of a local file.
pub fn compute_version(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Files under a root directory (typically a repository checkout).
///
/// Revisions are content hashes, so any external edit to a file changes its
/// revision. Writes from this store are serialized and land atomically via a
/// temporary sibling file.
#[derive(Debug)]
pub struct FileSystemStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a store path onto the root, refusing anything that would escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(StoreError::Backend(format!("path '{}' must be relative to the store root", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentStore for FileSystemStore {
    async fn fetch_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(Some(StoredFile {
                revision: compute_version(&content),
                content,
            })),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::Backend(format!("read {}: {}", full_path.display(), error))),
        }
    }

    async fn write_file(&self, path: &str, content: &str, expected_revision: Option<&str>) -> Result<String, StoreError> {
        let full_path = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let current = self.fetch_revision(path).await?;
        check_revision(path, expected_revision, current.as_deref())?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| StoreError::Backend(format!("create directory {}: {}", parent.display(), error)))?;
        }
        write_atomic(&full_path, content).await?;

        let revision = compute_version(content);
        debug!(path = %full_path.display(), %revision, "wrote file");
        Ok(revision)
    }
}

/// Sibling of `path` named `<file name>.tmp`.
fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let temporary_path = temporary_path(path);
    tokio::fs::write(&temporary_path, content)
        .await
        .map_err(|error| StoreError::Backend(format!("write temporary file {}: {}", temporary_path.display(), error)))?;
    tokio::fs::rename(&temporary_path, path)
        .await
        .map_err(|error| StoreError::Backend(format!("persist {} -> {}: {}", temporary_path.display(), path.display(), error)))
}
