//! # contract: seams between the seed pipeline and the outside world
//!
//! Two traits live here, both mockable with `mockall`:
//!
//! - [`DocumentStore`]: the target hierarchical database. One operation,
//!   `set`, which fully replaces the document at a path.
//! - [`SeedLoader`]: discovers and parses seed files into [`LoadedSeed`]s.
//!
//! Store implementations return a boxed error so that transport details
//! (HTTP status, auth failures) stay with the implementor; the importer only
//! attaches the seed source and document path.
//!
//! The traits are `Send + Sync` and intended for async/await usage. Mocks are
//! exported under the `test-export-mocks` feature so that downstream crates
//! can use them in their own tests.

use async_trait::async_trait;
use mockall::automock;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use crate::error::SeedError;

/// Error returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Field payload of one document.
pub type Fields = Map<String, Value>;

/// Address of a document: alternating collection and document segments.
///
/// The empty path is the database root, the parent of every top-level
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of document `document_id` in collection `collection` under `self`.
    pub fn child(&self, collection: &str, document_id: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 2);
        segments.extend(self.segments.iter().cloned());
        segments.push(collection.to_string());
        segments.push(document_id.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn document_id(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Target document database.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `payload` at `path`, replacing any existing document. No merge.
    async fn set(&self, path: DocumentPath, payload: Fields) -> Result<(), StoreError>;
}

/// One discovered seed file, parsed but not yet validated.
#[derive(Debug, Clone)]
pub struct LoadedSeed {
    /// Label used in diagnostics and reports (the file name).
    pub name: String,
    pub path: PathBuf,
    pub tree: Value,
}

/// Discovers and parses seed sources.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SeedLoader: Send + Sync {
    /// Load every seed source, in the order they must be imported.
    async fn load_all(&self) -> Result<Vec<LoadedSeed>, SeedError>;
}
