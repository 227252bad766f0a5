use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::contract::{LoadedSeed, SeedLoader};
use crate::error::SeedError;

/// Loads every `*.json` file of a seed directory, in file-name order, falling
/// back to a single legacy seed file when the directory is absent or empty.
pub struct DirectorySeedLoader {
    seed_dir: PathBuf,
    fallback_file: PathBuf,
}

impl DirectorySeedLoader {
    pub fn new(seed_dir: impl Into<PathBuf>, fallback_file: impl Into<PathBuf>) -> Self {
        Self {
            seed_dir: seed_dir.into(),
            fallback_file: fallback_file.into(),
        }
    }

    /// Seed files to load, without reading them.
    pub async fn discover(&self) -> Result<Vec<PathBuf>, SeedError> {
        let mut files = json_files_in(&self.seed_dir).await?;
        if !files.is_empty() {
            info!(seed_dir = %self.seed_dir.display(), count = files.len(), "Discovered seed files");
            return Ok(files);
        }

        let fallback_exists = tokio::fs::try_exists(&self.fallback_file)
            .await
            .map_err(|e| SeedError::Io {
                path: self.fallback_file.clone(),
                source: e,
            })?;
        if fallback_exists {
            warn!(
                seed_dir = %self.seed_dir.display(),
                fallback_file = %self.fallback_file.display(),
                "No seed files in directory, using fallback seed file"
            );
            files.push(self.fallback_file.clone());
            return Ok(files);
        }

        error!(
            seed_dir = %self.seed_dir.display(),
            fallback_file = %self.fallback_file.display(),
            "No seed sources found"
        );
        Err(SeedError::NoSeedSources {
            seed_dir: self.seed_dir.clone(),
            fallback_file: self.fallback_file.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SeedLoader for DirectorySeedLoader {
    async fn load_all(&self) -> Result<Vec<LoadedSeed>, SeedError> {
        let files = self.discover().await?;
        let mut seeds = Vec::with_capacity(files.len());
        for path in files {
            seeds.push(load_seed_file(&path).await?);
        }
        Ok(seeds)
    }
}

/// Read and parse one seed file. The file name becomes the source name.
pub async fn load_seed_file(path: &Path) -> Result<LoadedSeed, SeedError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read seed file");
        SeedError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    let tree = serde_json::from_str(&raw).map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to parse seed file");
        SeedError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(source = %name, bytes = raw.len(), "Loaded seed file");
    Ok(LoadedSeed {
        name,
        path: path.to_path_buf(),
        tree,
    })
}

/// Regular `*.json` files directly inside `dir`, sorted by file name.
/// A missing directory yields no files.
async fn json_files_in(dir: &Path) -> Result<Vec<PathBuf>, SeedError> {
    let io_err = |e: std::io::Error| SeedError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(seed_dir = %dir.display(), "Seed directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && tokio::fs::metadata(&path).await.map_err(io_err)?.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
