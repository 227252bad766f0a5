//! Error type shared by every stage of a seed run.
//!
//! Nothing here is recovered locally: each variant aborts the current seed
//! source and, through the orchestrator, the whole run. Messages always name
//! the seed source (or file) and, where it applies, the document path.

use std::path::PathBuf;
use thiserror::Error;

use crate::contract::StoreError;

#[derive(Debug, Error)]
pub enum SeedError {
    /// The store credential file is absent, unreadable or not a service account key.
    #[error(
        "service account credentials unavailable at {path}: {reason}. \
         Set FIREBASE_SERVICE_ACCOUNT_PATH to your service account JSON"
    )]
    MissingCredential { path: PathBuf, reason: String },

    /// Neither the seed nor the environment supplies an application identifier.
    #[error(
        "missing application identifier for seed source '{source_name}': \
         add \"appId\" to the seed or set APP_ID_GUID"
    )]
    MissingIdentifier { source_name: String },

    /// No seed file could be discovered.
    #[error("no seed sources found: no *.json in {seed_dir} and no fallback file at {fallback_file}")]
    NoSeedSources {
        seed_dir: PathBuf,
        fallback_file: PathBuf,
    },

    /// The seed tree does not have the expected structure.
    #[error("malformed seed '{source_name}' at {location}: {reason}")]
    MalformedSeed {
        source_name: String,
        location: String,
        reason: String,
    },

    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A store write failed. Children of the document were not written.
    #[error("seed source '{source_name}': write to {path} failed: {source}")]
    Write {
        source_name: String,
        path: String,
        #[source]
        source: StoreError,
    },
}
