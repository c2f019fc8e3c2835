//! Trait seam for the external downloader tool

use async_trait::async_trait;
use std::path::PathBuf;

use crate::types::{Availability, FormatInventory};

/// Interface to the external downloader executable.
///
/// Probe and query failures are carried as diagnostic text for the
/// extension — they are reply content, never process faults.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Locate the executable, if any.
    fn resolve(&self) -> Option<PathBuf>;

    /// Check that the tool exists and answers `--version`.
    async fn probe(&self) -> Availability;

    /// Enumerate selectable formats for `url`.
    async fn query_formats(&self, url: &str) -> Result<FormatInventory, String>;
}
