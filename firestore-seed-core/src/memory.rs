use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

use crate::contract::{DocumentPath, DocumentStore, Fields, StoreError};

/// In-process [`DocumentStore`]: a map from document path to payload plus a
/// log of every write in issue order. Backs `--dry-run` and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Fields>>,
    writes: Mutex<Vec<DocumentPath>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored payload at `path` (segments joined with `/`).
    pub fn get(&self, path: &str) -> Option<Fields> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored document, keyed by path.
    pub fn snapshot(&self) -> BTreeMap<String, Fields> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Every write issued so far, in order, including overwrites.
    pub fn writes(&self) -> Vec<DocumentPath> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn set(&self, path: DocumentPath, payload: Fields) -> Result<(), StoreError> {
        if path.is_root() {
            return Err("cannot write a document at the database root".into());
        }
        debug!(path = %path, fields = payload.len(), "MemoryStore set");
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_string(), payload);
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path);
        Ok(())
    }
}
