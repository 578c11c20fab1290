//! Plugin discovery and directory scanning
//!
//! Finds native plugin modules (files with the platform's shared-library
//! extension) in a directory. Loading is left to [`PluginLoader::load_all`].
//!
//! [`PluginLoader::load_all`]: crate::PluginLoader::load_all

use std::env::consts::DLL_EXTENSION;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during plugin discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory: {0}")]
    ReadDirectory(#[source] std::io::Error),
}

/// True when `path` carries the platform's shared-library extension
pub fn is_native_library(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == DLL_EXTENSION)
        .unwrap_or(false)
}

/// List plugin modules in `dir`, sorted by path
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DiscoveryError> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(DiscoveryError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(DiscoveryError::ReadDirectory)?;

    let mut modules = Vec::new();
    for entry in entries {
        let path = entry.map_err(DiscoveryError::ReadDirectory)?.path();
        if path.is_file() && is_native_library(&path) {
            modules.push(path);
        }
    }
    modules.sort();

    tracing::debug!(dir = %dir.display(), found = modules.len(), "Directory scanned");
    Ok(modules)
}
