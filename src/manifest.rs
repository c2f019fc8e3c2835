//! Native messaging manifest store
//!
//! The browser locates this bridge through a JSON manifest carrying an
//! `allowed_extensions` list. The bridge can rewrite that list to a single
//! extension id; it never creates the manifest — installation owns that.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::ManifestConfig;
use crate::error::{Error, Result};

/// Application directory holding the manifest
const APP_DIR: &str = "StreamSniper";

/// Manifest file name registered with the browser
const MANIFEST_NAME: &str = "com.streamsniper.ytdlp.json";

/// Outcome of a successful manifest rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpdate {
    /// Path of the rewritten manifest
    pub path: PathBuf,
    /// Extension id now allowed
    pub extension_id: String,
}

/// Resolve the manifest path: explicit override, else the platform default.
pub fn manifest_path(config: &ManifestConfig) -> Result<PathBuf> {
    if let Some(path) = &config.path {
        return Ok(path.clone());
    }
    default_manifest_path()
}

#[cfg(windows)]
fn default_manifest_path() -> Result<PathBuf> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| Error::Manifest("APPDATA is not set".to_string()))?;
    Ok(PathBuf::from(appdata).join(APP_DIR).join(MANIFEST_NAME))
}

#[cfg(target_os = "macos")]
fn default_manifest_path() -> Result<PathBuf> {
    let home = home_dir()?;
    Ok(home
        .join("Library")
        .join("Application Support")
        .join(APP_DIR)
        .join(MANIFEST_NAME))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn default_manifest_path() -> Result<PathBuf> {
    let home = home_dir()?;
    Ok(home
        .join(".local")
        .join("share")
        .join(APP_DIR)
        .join(MANIFEST_NAME))
}

#[cfg(unix)]
fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::Manifest("HOME is not set".to_string()))
}

/// Rewrite `allowed_extensions` to the single given id.
///
/// A `.backup` copy of the manifest's previous contents is written before
/// the original is overwritten. A missing manifest is a distinct error
/// naming the expected path, and nothing is created or touched in that case.
pub async fn update(config: &ManifestConfig, extension_id: &str) -> Result<ManifestUpdate> {
    let path = manifest_path(config)?;
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(Error::ManifestMissing { path });
    }

    let previous = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::Manifest(format!("failed to read {}: {e}", path.display())))?;
    let mut manifest: Value = serde_json::from_str(&previous)
        .map_err(|e| Error::Manifest(format!("invalid manifest JSON: {e}")))?;
    let Value::Object(fields) = &mut manifest else {
        return Err(Error::Manifest(
            "manifest root is not a JSON object".to_string(),
        ));
    };

    fields.insert(
        "allowed_extensions".to_string(),
        Value::Array(vec![Value::String(extension_id.to_string())]),
    );
    let updated = serde_json::to_string_pretty(&manifest)?;

    let backup = backup_path(&path);
    tokio::fs::write(&backup, &previous)
        .await
        .map_err(|e| Error::Manifest(format!("failed to write {}: {e}", backup.display())))?;
    tokio::fs::write(&path, &updated)
        .await
        .map_err(|e| Error::Manifest(format!("failed to write {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), extension_id, "manifest rewritten");
    Ok(ManifestUpdate {
        path,
        extension_id: extension_id.to_string(),
    })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_os_string();
    backup.push(".backup");
    PathBuf::from(backup)
}
