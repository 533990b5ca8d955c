//! Saving one workflow's entry into the shared override document.
//!
//! A save runs strictly in order:
//! 1. read the current document (absent means `workflows: {}`),
//! 2. replace exactly the edited workflow's entry,
//! 3. re-read the revision token right before writing,
//! 4. write conditioned on that token (or as a create when there is none),
//! 5. report a revision mismatch as [`PersistError::Conflict`].
//!
//! There is no retry and no merge. A concurrent edit landing between steps 1
//! and 3 is overwritten (a warning is logged); one landing between steps 3
//! and 4 is detected by the store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use wdui_types::{ConfigDocument, WorkflowConfigEntry};

use crate::document::{DocumentError, parse_config_document, upsert_workflow_entry};
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Error)]
pub enum PersistError {
    /// Someone else updated the document; the caller should reload and retry.
    #[error("{path} was changed by someone else while saving; reload and retry")]
    Conflict {
        path: String,
        expected: Option<String>,
        actual: Option<String>,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Store(StoreError),
}

impl PersistError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<StoreError> for PersistError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { path, expected, actual } => Self::Conflict { path, expected, actual },
            other => Self::Store(other),
        }
    }
}

/// The override document as last read, with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedDocument {
    pub document: ConfigDocument,
    /// `None` when the document does not exist yet.
    pub revision: Option<String>,
}

impl LoadedDocument {
    pub fn exists(&self) -> bool {
        self.revision.is_some()
    }

    pub fn entry(&self, workflow_file: &str) -> Option<&WorkflowConfigEntry> {
        self.document.entry(workflow_file)
    }
}

pub struct ConfigPersister {
    store: Arc<dyn ContentStore>,
    path: String,
}

impl ConfigPersister {
    pub fn new(store: Arc<dyn ContentStore>, path: impl Into<String>) -> Self {
        Self { store, path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the override document. A missing file is an empty document; an
    /// unparseable one is an error rather than a silent fallback.
    pub async fn load(&self) -> Result<LoadedDocument, PersistError> {
        match self.store.fetch_file(&self.path).await? {
            Some(file) => Ok(LoadedDocument {
                document: parse_config_document(&file.content)?,
                revision: Some(file.revision),
            }),
            None => Ok(LoadedDocument::default()),
        }
    }

    /// Replaces `workflows[workflow_file]` with `entry` and writes the document
    /// back. Returns the new revision.
    pub async fn save_entry(&self, workflow_file: &str, entry: &WorkflowConfigEntry) -> Result<String, PersistError> {
        let current = self.store.fetch_file(&self.path).await?;
        let read_revision = current.as_ref().map(|file| file.revision.clone());
        let content = upsert_workflow_entry(current.as_ref().map(|file| file.content.as_str()), workflow_file, entry)?;

        let write_revision = self.store.fetch_revision(&self.path).await?;
        if write_revision != read_revision {
            warn!(
                path = %self.path,
                read = ?read_revision,
                current = ?write_revision,
                "override document changed after it was read; writing against the latest revision"
            );
        }

        let revision = self
            .store
            .write_file(&self.path, &content, write_revision.as_deref())
            .await?;
        info!(path = %self.path, workflow = %workflow_file, %revision, "saved workflow configuration");
        Ok(revision)
    }
}
