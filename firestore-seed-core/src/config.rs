use std::path::PathBuf;
use tracing::{debug, info};

/// Primary environment variable for the application identifier.
pub const APP_ID_ENV: &str = "APP_ID_GUID";
/// Legacy alias, consulted when the primary is unset or empty.
pub const LEGACY_APP_ID_ENV: &str = "NEXT_APP_ID_GUID";

pub const DEFAULT_SEED_DIR: &str = "scripts/seed-firestore/seeds";
pub const DEFAULT_SEED_FILE: &str = "scripts/seed-firestore/firestore-seed.json";

/// Externally configured application identifier, read once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdConfig {
    pub primary: Option<String>,
    pub legacy: Option<String>,
}

impl AppIdConfig {
    pub fn from_env() -> Self {
        Self {
            primary: std::env::var(APP_ID_ENV).ok(),
            legacy: std::env::var(LEGACY_APP_ID_ENV).ok(),
        }
    }

    /// The configured identifier: primary wins, empty values count as unset.
    pub fn configured(&self) -> Option<&str> {
        [self.primary.as_deref(), self.legacy.as_deref()]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
    }
}

/// How sibling documents of one collection level are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Issue sibling writes concurrently. A document is still written
    /// before any of its children.
    pub parallel: bool,
}

/// Everything the core needs for one run.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub seed_dir: PathBuf,
    pub fallback_file: PathBuf,
    pub app_id: AppIdConfig,
    pub import: ImportOptions,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed_dir: PathBuf::from(DEFAULT_SEED_DIR),
            fallback_file: PathBuf::from(DEFAULT_SEED_FILE),
            app_id: AppIdConfig::default(),
            import: ImportOptions::default(),
        }
    }
}

impl SeedConfig {
    pub fn trace_loaded(&self) {
        info!(
            seed_dir = %self.seed_dir.display(),
            fallback_file = %self.fallback_file.display(),
            app_id_configured = self.app_id.configured().is_some(),
            parallel = self.import.parallel,
            "Loaded SeedConfig"
        );
        debug!(?self, "SeedConfig loaded (full debug)");
    }
}
