//! Service account key loading.
//!
//! Go to Project Settings → Service accounts → "Generate new private key" in
//! the Firebase console and point `FIREBASE_SERVICE_ACCOUNT_PATH` (or
//! `--credentials`) at the downloaded JSON.

use firestore_seed_core::error::SeedError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

pub const SERVICE_ACCOUNT_PATH_ENV: &str = "FIREBASE_SERVICE_ACCOUNT_PATH";
pub const DEFAULT_SERVICE_ACCOUNT_PATH: &str =
    "scripts/seed-firestore/data-provider-firebase-adminsdk.json";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service account key file that the client uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Read a service account key file. Any failure is a
/// [`SeedError::MissingCredential`] naming the path.
pub fn load_service_account(path: &Path) -> Result<ServiceAccountKey, SeedError> {
    let missing = |reason: String| SeedError::MissingCredential {
        path: path.to_path_buf(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read service account file");
        if e.kind() == std::io::ErrorKind::NotFound {
            missing("file not found".to_string())
        } else {
            missing(format!("file unreadable: {e}"))
        }
    })?;

    let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
        error!(error = %e, path = %path.display(), "Service account file is not a valid key");
        missing(format!("not a service account key: {e}"))
    })?;

    info!(
        path = %path.display(),
        project_id = %key.project_id,
        client_email = %key.client_email,
        "Loaded service account credentials"
    );
    Ok(key)
}
