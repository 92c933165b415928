//! The file collection: ordered uploads plus the active selection.
//!
//! Identity is positional: the index in the collection plus the name.
//! Two files with identical names may coexist; nothing deduplicates.
//! Insertion order is preserved, nothing implicitly reorders.
//!
//! The invariant the rest of the core leans on: `active_index()` is a
//! valid index whenever the collection is non-empty, and exactly `None`
//! when it is empty. Every mutation re-establishes it before returning.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A single uploaded file: metadata plus (usually) its raw bytes.
///
/// Immutable once added; removal from the collection is the only mutation.
/// `bytes` is `None` only for metadata placeholders rehydrated from the
/// session store; those cannot be converted and must be re-uploaded.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    name: String,
    media_type: String,
    len: u64,
    modified_ms: u64,
    bytes: Option<Arc<Vec<u8>>>,
}

impl ManagedFile {
    /// Wrap a freshly uploaded file.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
        modified_ms: u64,
    ) -> Self {
        let bytes = Arc::new(bytes);
        Self {
            name: name.into(),
            media_type: media_type.into(),
            len: bytes.len() as u64,
            modified_ms,
            bytes: Some(bytes),
        }
    }

    /// Rebuild a metadata-only placeholder from a persisted snapshot.
    pub fn placeholder(snapshot: &FileSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            media_type: snapshot.media_type.clone(),
            len: snapshot.len,
            modified_ms: snapshot.modified_ms,
            bytes: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn modified_ms(&self) -> u64 {
        self.modified_ms
    }

    /// The raw content, shared with any resource handles derived from it.
    pub fn shared_bytes(&self) -> Option<&Arc<Vec<u8>>> {
        self.bytes.as_ref()
    }

    /// True for rehydrated placeholders whose bytes did not survive the
    /// session reload. Presentation must prompt for re-upload.
    pub fn needs_reupload(&self) -> bool {
        self.bytes.is_none()
    }

    /// Metadata-only view for the session store. Bytes are never persisted.
    pub fn snapshot(&self) -> FileSnapshot {
        FileSnapshot {
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            len: self.len,
            modified_ms: self.modified_ms,
        }
    }
}

/// What survives a session reload: name, declared type, size, timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub name: String,
    pub media_type: String,
    pub len: u64,
    pub modified_ms: u64,
}

/// Ordered sequence of managed files with one active selection.
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    files: Vec<ManagedFile>,
    active: Option<usize>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ManagedFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedFile> {
        self.files.iter()
    }

    /// The active index, or `None` exactly when the collection is empty.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_file(&self) -> Option<&ManagedFile> {
        self.active.and_then(|i| self.files.get(i))
    }

    /// Append files in the order provided and activate the last appended
    /// one. Any preview error state belonging to the previous selection is
    /// the orchestrator's to clear; callers re-select after adding.
    pub fn add(&mut self, files: impl IntoIterator<Item = ManagedFile>) {
        let before = self.files.len();
        self.files.extend(files);
        if self.files.len() > before {
            self.active = Some(self.files.len() - 1);
            debug!(
                added = self.files.len() - before,
                active = self.files.len() - 1,
                "files added"
            );
        }
    }

    /// Remove the file at `index`, then clamp the active index to
    /// `min(active, len - 1)`, or `None` once the collection is empty.
    pub fn remove(&mut self, index: usize) -> Result<ManagedFile, WorkflowError> {
        if index >= self.files.len() {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        let removed = self.files.remove(index);
        self.active = match self.active {
            _ if self.files.is_empty() => None,
            Some(a) => Some(a.min(self.files.len() - 1)),
            None => None,
        };
        debug!(index, remaining = self.files.len(), "file removed");
        Ok(removed)
    }

    /// Switch the active selection. The caller must follow up with a fresh
    /// preview request; the collection itself knows nothing about previews.
    pub fn set_active(&mut self, index: usize) -> Result<(), WorkflowError> {
        if index >= self.files.len() {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        self.active = Some(index);
        Ok(())
    }

    /// Replace the whole sequence (session rehydration only). The active
    /// index is not moved beyond the clamp the invariant requires.
    pub fn replace_all(&mut self, files: Vec<ManagedFile>) {
        self.files = files;
        self.active = if self.files.is_empty() {
            None
        } else {
            Some(self.active.unwrap_or(0).min(self.files.len() - 1))
        };
    }

    /// Metadata snapshots for the session store.
    pub fn snapshots(&self) -> Vec<FileSnapshot> {
        self.files.iter().map(ManagedFile::snapshot).collect()
    }

    /// Rebuild a collection of placeholders from persisted snapshots.
    pub fn from_snapshots(snapshots: &[FileSnapshot]) -> Self {
        let files: Vec<ManagedFile> = snapshots.iter().map(ManagedFile::placeholder).collect();
        let active = if files.is_empty() {
            None
        } else {
            Some(files.len() - 1)
        };
        Self { files, active }
    }
}
