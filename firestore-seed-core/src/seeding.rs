//! High-level pipeline: validate → resolve identifier → import, per seed source.
//!
//! Sources are processed strictly in the order the loader returned them and
//! never overlap. Each source is imported completely before the next one
//! starts; the first error of any stage aborts the run and is returned as is.
//! When two sources write the same document path, the later source wins.
//!
//! # Navigation
//! - Main entrypoint: [`seed_all`]
//! - Per source: [`seed_source`]
//! - Output: [`SeedReport`]

use serde_json::Value;
use tracing::{error, info};

use crate::config::{AppIdConfig, ImportOptions};
use crate::contract::{DocumentPath, DocumentStore, LoadedSeed};
use crate::error::SeedError;
use crate::identifier::{effective_app_id, resolve_app_id};
use crate::import::import_collections;
use crate::seed::{effective_location, SeedDocument, APP_ID_KEY};

/// What a run wrote.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub sources: Vec<SourceReport>,
}

impl SeedReport {
    pub fn documents_written(&self) -> usize {
        self.sources.iter().map(|s| s.documents.len()).sum()
    }
}

#[derive(Debug)]
pub struct SourceReport {
    pub source_name: String,
    pub app_id: String,
    /// Written document paths, parents before their children.
    pub documents: Vec<DocumentPath>,
}

/// Import every seed source into `store`, in order.
pub async fn seed_all<S>(
    seeds: Vec<LoadedSeed>,
    store: &S,
    app_ids: &AppIdConfig,
    options: ImportOptions,
) -> Result<SeedReport, SeedError>
where
    S: DocumentStore + ?Sized,
{
    info!(sources = seeds.len(), parallel = options.parallel, "[SEED] Starting seed run");
    let mut report = SeedReport::default();
    for seed in seeds {
        let source_report = seed_source(seed, store, app_ids, options).await?;
        report.sources.push(source_report);
    }
    info!(
        sources = report.sources.len(),
        documents = report.documents_written(),
        "[SEED] Seed run complete"
    );
    Ok(report)
}

/// Validate, resolve and import a single seed source.
pub async fn seed_source<S>(
    seed: LoadedSeed,
    store: &S,
    app_ids: &AppIdConfig,
    options: ImportOptions,
) -> Result<SourceReport, SeedError>
where
    S: DocumentStore + ?Sized,
{
    let LoadedSeed { name, path, tree } = seed;
    info!(source = %name, path = %path.display(), "[SEED] Importing seed source");

    let embedded = tree
        .get(APP_ID_KEY)
        .and_then(Value::as_str)
        .map(str::to_owned);
    let document = SeedDocument::from_value(tree, &name).map_err(|e| {
        let e = with_effective_location(e, embedded.as_deref(), app_ids);
        error!(source = %name, error = %e, "[SEED][ERROR] Seed validation failed");
        e
    })?;
    let app_id = resolve_app_id(&document, &name, app_ids)?;

    let documents = import_collections(store, &document.collections, &app_id, &name, options)
        .await
        .map_err(|e| {
            error!(source = %name, error = %e, "[SEED][ERROR] Import failed");
            e
        })?;

    info!(
        source = %name,
        app_id = %app_id,
        documents = documents.len(),
        "[SEED] Seed source imported"
    );
    Ok(SourceReport {
        source_name: name,
        app_id,
        documents,
    })
}

/// Append the path the importer would have written to a shape error whose
/// raw location goes through a placeholder document id.
fn with_effective_location(err: SeedError, embedded: Option<&str>, app_ids: &AppIdConfig) -> SeedError {
    match err {
        SeedError::MalformedSeed {
            source_name,
            location,
            reason,
        } => {
            let effective = effective_app_id(embedded, app_ids)
                .map(|app_id| effective_location(&location, app_id))
                .filter(|effective| *effective != location);
            let reason = match effective {
                Some(effective) => format!("{reason} (effective path {effective})"),
                None => reason,
            };
            SeedError::MalformedSeed {
                source_name,
                location,
                reason,
            }
        }
        other => other,
    }
}
