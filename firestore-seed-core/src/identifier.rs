//! Application identifier resolution.

use tracing::{error, info};

use crate::config::{AppIdConfig, APP_ID_ENV, LEGACY_APP_ID_ENV};
use crate::error::SeedError;
use crate::seed::{SeedDocument, APP_ID_KEY};

/// Identifier for `seed`: the embedded `appId` if non-empty, else the
/// configured one, else [`SeedError::MissingIdentifier`].
///
/// The identifier replaces placeholder document keys, so it must be a single
/// path segment; one containing `/` is rejected as [`SeedError::MalformedSeed`].
pub fn resolve_app_id(
    seed: &SeedDocument,
    source_name: &str,
    config: &AppIdConfig,
) -> Result<String, SeedError> {
    let Some((app_id, origin)) = select_app_id(seed.app_id.as_deref(), config) else {
        error!(source = source_name, "No appId in seed and none configured");
        return Err(SeedError::MissingIdentifier {
            source_name: source_name.to_string(),
        });
    };

    if app_id.contains('/') {
        error!(source = source_name, app_id, origin, "appId is not a single path segment");
        return Err(SeedError::MalformedSeed {
            source_name: source_name.to_string(),
            location: origin.to_string(),
            reason: format!("application identifier '{app_id}' contains '/'"),
        });
    }

    info!(source = source_name, app_id, origin, "Resolved appId");
    Ok(app_id.to_string())
}

/// The identifier a seed with embedded id `embedded` would use, without
/// validating it.
pub fn effective_app_id<'a>(embedded: Option<&'a str>, config: &'a AppIdConfig) -> Option<&'a str> {
    select_app_id(embedded, config).map(|(app_id, _)| app_id)
}

/// The chosen identifier and where it came from.
fn select_app_id<'a>(
    embedded: Option<&'a str>,
    config: &'a AppIdConfig,
) -> Option<(&'a str, &'static str)> {
    if let Some(embedded) = embedded.filter(|id| !id.is_empty()) {
        return Some((embedded, APP_ID_KEY));
    }
    let configured = config.configured()?;
    let origin = if config.primary.as_deref() == Some(configured) {
        APP_ID_ENV
    } else {
        LEGACY_APP_ID_ENV
    };
    Some((configured, origin))
}
