use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ContentStore, StoreError, StoredFile, check_revision};

#[derive(Debug, Default)]
struct Files {
    entries: HashMap<String, StoredFile>,
    next_revision: u64,
}

/// Process-local store with counter revisions (`r1`, `r2`, ...).
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    files: Mutex<Files>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, replacing any existing one; returns its revision.
    pub fn insert(&self, path: &str, content: &str) -> Result<String, StoreError> {
        let mut files = self.lock()?;
        Ok(files.put(path, content))
    }

    /// Current content of a file, bypassing revision bookkeeping.
    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().ok()?.entries.get(path).map(|file| file.content.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Files>, StoreError> {
        self.files
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

impl Files {
    fn put(&mut self, path: &str, content: &str) -> String {
        self.next_revision += 1;
        let revision = format!("r{}", self.next_revision);
        self.entries.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                revision: revision.clone(),
            },
        );
        revision
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        Ok(self.lock()?.entries.get(path).cloned())
    }

    async fn write_file(&self, path: &str, content: &str, expected_revision: Option<&str>) -> Result<String, StoreError> {
        let mut files = self.lock()?;
        let current = files.entries.get(path).map(|file| file.revision.as_str());
        check_revision(path, expected_revision, current)?;
        Ok(files.put(path, content))
    }
}
