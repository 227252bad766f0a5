///
/// This module implements the CLI interface for firestore-seed: command
/// parsing, store selection, and user-visible output.
///
/// All seed logic (tree model, substitution, import, orchestration) lives in
/// the [`firestore-seed-core`] crate. This module is glue: it turns flags and
/// environment into a configuration, picks the store, and reports.
///
/// ## How To Use
/// - From the command line: `firestore-seed seed --help`.
/// - Programmatically or in tests: call [`run`] with a constructed [`Cli`].
///
/// [`firestore-seed-core`]: ../../firestore-seed-core/
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use firestore_seed_core::contract::{DocumentStore, SeedLoader};
use firestore_seed_core::error::SeedError;
use firestore_seed_core::loader::DirectorySeedLoader;
use firestore_seed_core::memory::MemoryStore;
use firestore_seed_core::seeding::seed_all;
use std::path::PathBuf;

use crate::firestore::FirestoreClient;
use crate::load_config::{load_config, StoreTarget};

/// CLI for firestore-seed: load declarative JSON seed files into Firestore.
#[derive(Parser)]
#[clap(
    name = "firestore-seed",
    version,
    about = "Populate Cloud Firestore from declarative JSON seed files"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every seed source into the target database
    Seed(SeedArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SeedArgs {
    /// Directory of *.json seed files [default: scripts/seed-firestore/seeds]
    #[clap(long)]
    pub seed_dir: Option<PathBuf>,
    /// Single seed file used when the directory has none [default: scripts/seed-firestore/firestore-seed.json]
    #[clap(long)]
    pub seed_file: Option<PathBuf>,
    /// Service account key file (overrides FIREBASE_SERVICE_ACCOUNT_PATH)
    #[clap(long)]
    pub credentials: Option<PathBuf>,
    /// Write sibling documents concurrently
    #[clap(long)]
    pub parallel: bool,
    /// Import into memory and print what would be written
    #[clap(long)]
    pub dry_run: bool,
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Seed(args) => {
            let config = load_config(&args)?;
            config.trace_loaded();

            let loader = DirectorySeedLoader::new(&config.seed.seed_dir, &config.seed.fallback_file);
            let seeds = loader.load_all().await?;
            tracing::info!(command = "seed", sources = seeds.len(), "Seed sources loaded");

            let store = open_store(&config.store)?;
            let report = seed_all(seeds, &*store, &config.seed.app_id, config.seed.import).await?;

            for source in &report.sources {
                println!(
                    "Firestore seed completed for appId: {} ({}, {} documents)",
                    source.app_id,
                    source.source_name,
                    source.documents.len()
                );
                if matches!(config.store, StoreTarget::DryRun) {
                    for path in &source.documents {
                        println!("  {path}");
                    }
                }
            }
            tracing::info!(command = "seed", ?report, "Seeding complete");
            Ok(())
        }
    }
}

/// The store handle for this run, created once and passed down explicitly.
fn open_store(target: &StoreTarget) -> Result<Box<dyn DocumentStore>, SeedError> {
    match target {
        StoreTarget::DryRun => Ok(Box::new(MemoryStore::new())),
        StoreTarget::Firestore(target) => {
            let client = FirestoreClient::connect(
                &target.credentials_path,
                target.emulator_host.as_deref(),
                target.project_id.as_deref(),
            )?;
            Ok(Box::new(client))
        }
    }
}
