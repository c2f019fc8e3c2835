//! Configuration types for ytdlp-bridge
//!
//! The bridge is launched by the browser with no usable argv, so defaults
//! cover everything and the only override channel is the environment
//! ([`Config::from_env`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the downloader executable path
pub const ENV_YTDLP_PATH: &str = "YTDLP_BRIDGE_YTDLP_PATH";
/// Environment variable overriding the native messaging manifest path
pub const ENV_MANIFEST_PATH: &str = "YTDLP_BRIDGE_MANIFEST_PATH";

/// External downloader discovery and probing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Explicit path to the downloader executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Candidate executable names searched on PATH, in order
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Timeout for the `--version` availability probe, in seconds (default: 5)
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Timeout for format enumeration, in seconds (default: 30)
    ///
    /// Format enumeration performs network access, so this is deliberately
    /// much longer than the probe timeout.
    #[serde(default = "default_formats_timeout_secs")]
    pub formats_timeout_secs: u64,
}

impl ToolConfig {
    /// Availability probe timeout as a [`Duration`]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Format enumeration timeout as a [`Duration`]
    pub fn formats_timeout(&self) -> Duration {
        Duration::from_secs(self.formats_timeout_secs)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            candidates: default_candidates(),
            probe_timeout_secs: default_probe_timeout_secs(),
            formats_timeout_secs: default_formats_timeout_secs(),
        }
    }
}

/// Native messaging manifest location
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Override for the manifest file path (platform default if None)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Main configuration for the bridge
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External downloader settings
    #[serde(default)]
    pub tool: ToolConfig,

    /// Manifest store settings
    #[serde(default)]
    pub manifest: ManifestConfig,
}

impl Config {
    /// Build a configuration from defaults plus environment overrides.
    ///
    /// Recognized variables: [`ENV_YTDLP_PATH`] pins the downloader
    /// executable, [`ENV_MANIFEST_PATH`] relocates the manifest file.
    /// Empty values are ignored.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(path) = non_empty_env(ENV_YTDLP_PATH) {
            config.tool.ytdlp_path = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty_env(ENV_MANIFEST_PATH) {
            config.manifest.path = Some(PathBuf::from(path));
        }
        config
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn default_candidates() -> Vec<String> {
    ["yt-dlp", "yt-dlp.exe", "youtube-dl", "youtube-dl.exe"]
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_formats_timeout_secs() -> u64 {
    30
}
