//! CLI-backed implementation of [`ToolBackend`]
//!
//! Shells out to yt-dlp (or a youtube-dl fallback) found on PATH via the
//! `which` crate, with an explicit configured path short-circuiting the
//! search. The availability probe and the format query are the only places
//! in the bridge with timeouts — downloads themselves run unbounded.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tokio::time::timeout;

use super::ToolBackend;
use crate::config::ToolConfig;
use crate::types::{Availability, FormatDescriptor, FormatInventory};

/// yt-dlp driven through its command-line interface
pub struct CliTool {
    config: ToolConfig,
}

impl CliTool {
    /// Create a CLI backend over the given tool configuration.
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolBackend for CliTool {
    fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.ytdlp_path {
            // which() also validates an explicit override: the configured
            // path must exist and be executable.
            return which::which(path).ok();
        }
        self.config
            .candidates
            .iter()
            .find_map(|name| which::which(name).ok())
    }

    async fn probe(&self) -> Availability {
        let Some(path) = self.resolve() else {
            return unavailable("yt-dlp not found in system PATH");
        };

        let version = Command::new(&path).arg("--version").output();
        match timeout(self.config.probe_timeout(), version).await {
            Err(_) => unavailable("yt-dlp command timed out"),
            Ok(Err(e)) => unavailable(format!("failed to execute yt-dlp: {e}")),
            Ok(Ok(output)) if output.status.success() => Availability {
                available: true,
                version: Some(String::from_utf8_lossy(&output.stdout).trim().to_string()),
                path: Some(path.display().to_string()),
                error: None,
            },
            Ok(Ok(output)) => unavailable(exit_error(&output)),
        }
    }

    async fn query_formats(&self, url: &str) -> Result<FormatInventory, String> {
        let Some(path) = self.resolve() else {
            return Err("yt-dlp not found".to_string());
        };

        tracing::debug!(url, tool = %path.display(), "enumerating formats");
        let dump = Command::new(&path)
            .arg("--dump-json")
            .arg("--no-playlist")
            .arg(url)
            .output();
        let output = match timeout(self.config.formats_timeout(), dump).await {
            Err(_) => return Err("Request timed out".to_string()),
            Ok(Err(e)) => return Err(format!("failed to execute yt-dlp: {e}")),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(format!(
                "yt-dlp error: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        parse_metadata(&output.stdout)
    }
}

fn unavailable(error: impl Into<String>) -> Availability {
    Availability {
        available: false,
        version: None,
        path: None,
        error: Some(error.into()),
    }
}

fn exit_error(output: &Output) -> String {
    match output.status.code() {
        Some(code) => format!("yt-dlp returned error code {code}"),
        None => "yt-dlp was terminated by a signal".to_string(),
    }
}

/// Single-media metadata document as emitted by `--dump-json`
#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

/// Per-format metadata entry. Every field is optional: the tool reports
/// wildly different subsets per extractor.
#[derive(Debug, Default, Deserialize)]
struct RawFormat {
    #[serde(default)]
    format_id: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    fps: Option<f64>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    filesize: Option<u64>,
    #[serde(default)]
    tbr: Option<f64>,
    #[serde(default)]
    format_note: Option<String>,
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        FormatDescriptor {
            id: raw.format_id.unwrap_or_default(),
            ext: raw.ext.unwrap_or_default(),
            resolution: raw.resolution.unwrap_or_else(|| "unknown".to_string()),
            width: raw.width,
            height: raw.height,
            fps: raw.fps,
            vcodec: raw.vcodec.unwrap_or_else(|| "none".to_string()),
            acodec: raw.acodec.unwrap_or_else(|| "none".to_string()),
            filesize: raw.filesize,
            tbr: raw.tbr,
            format_note: raw.format_note.unwrap_or_default(),
        }
    }
}

/// Parse the tool's JSON metadata into a format inventory.
///
/// `--dump-json` emits one JSON document per line; with `--no-playlist`
/// that is a single line, but only the first non-empty line is consumed
/// either way. Media without a `formats` array (single direct stream)
/// yields an empty inventory, which is still a success.
fn parse_metadata(stdout: &[u8]) -> Result<FormatInventory, String> {
    let text = String::from_utf8_lossy(stdout);
    let document = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    let metadata: RawMetadata = serde_json::from_str(document)
        .map_err(|e| format!("unparsable yt-dlp metadata: {e}"))?;

    Ok(FormatInventory {
        success: true,
        formats: metadata.formats.into_iter().map(Into::into).collect(),
        title: metadata.title.unwrap_or_else(|| "Unknown".to_string()),
    })
}
