/// `load_config` module: merges command-line flags and environment variables into the run configuration.
///
/// Precedence is flag, then environment, then built-in default. The only
/// environment this crate reads lives here, so the core never touches
/// process state.
///
/// # Environment
/// - `APP_ID_GUID` / `NEXT_APP_ID_GUID`: application identifier (primary wins)
/// - `FIREBASE_SERVICE_ACCOUNT_PATH`: service account key file
/// - `FIRESTORE_EMULATOR_HOST`: target a local emulator instead of Cloud Firestore
/// - `GCLOUD_PROJECT` / `GOOGLE_CLOUD_PROJECT`: project id override
///
/// # Errors
/// Errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use firestore_seed_core::config::{AppIdConfig, ImportOptions, SeedConfig};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::cli::SeedArgs;
use crate::credentials::{DEFAULT_SERVICE_ACCOUNT_PATH, SERVICE_ACCOUNT_PATH_ENV};
use crate::firestore::EMULATOR_HOST_ENV;

pub const PROJECT_ENV: &str = "GCLOUD_PROJECT";
pub const PROJECT_ENV_ALIAS: &str = "GOOGLE_CLOUD_PROJECT";

#[derive(Debug)]
pub struct CliConfig {
    pub seed: SeedConfig,
    pub store: StoreTarget,
}

/// Which store the run writes to.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreTarget {
    /// Import into memory only; nothing leaves the process.
    DryRun,
    Firestore(FirestoreTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreTarget {
    pub credentials_path: PathBuf,
    pub emulator_host: Option<String>,
    pub project_id: Option<String>,
}

impl CliConfig {
    pub fn trace_loaded(&self) {
        self.seed.trace_loaded();
        match &self.store {
            StoreTarget::DryRun => info!("Dry run: writes stay in memory"),
            StoreTarget::Firestore(target) => info!(
                credentials_path = %target.credentials_path.display(),
                emulator_host = target.emulator_host.as_deref().unwrap_or("-"),
                project_id = target.project_id.as_deref().unwrap_or("-"),
                "Loaded Firestore target"
            ),
        }
    }
}

/// Build the run configuration from parsed flags and the process environment.
pub fn load_config(args: &SeedArgs) -> Result<CliConfig> {
    let defaults = SeedConfig::default();
    let seed = SeedConfig {
        seed_dir: args.seed_dir.clone().unwrap_or(defaults.seed_dir),
        fallback_file: args.seed_file.clone().unwrap_or(defaults.fallback_file),
        app_id: AppIdConfig::from_env(),
        import: ImportOptions {
            parallel: args.parallel,
        },
    };

    let store = if args.dry_run {
        StoreTarget::DryRun
    } else {
        let credentials_path = args
            .credentials
            .clone()
            .or_else(|| env_non_empty(SERVICE_ACCOUNT_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVICE_ACCOUNT_PATH));
        StoreTarget::Firestore(FirestoreTarget {
            credentials_path,
            emulator_host: env_non_empty(EMULATOR_HOST_ENV),
            project_id: env_non_empty(PROJECT_ENV).or_else(|| env_non_empty(PROJECT_ENV_ALIAS)),
        })
    };

    debug!(?seed, ?store, "Merged flags and environment");
    Ok(CliConfig { seed, store })
}

/// Environment variable value, treating empty as unset.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
