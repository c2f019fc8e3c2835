//! # ytdlp-bridge
//!
//! Native messaging bridge between the Stream Sniper browser extension and
//! the external `yt-dlp` command-line downloader.
//!
//! The bridge speaks the browser's native messaging protocol — 4-byte
//! native-endian length prefix, UTF-8 JSON payload — on stdin/stdout. Each
//! inbound message selects one operation (availability check, format
//! listing, download start, manifest update); downloads run as independent
//! tasks that narrate the tool's progress back as typed events while the
//! loop keeps serving requests.
//!
//! ## Design Philosophy
//!
//! - **Orchestrate, don't download** - all media work happens inside
//!   yt-dlp; the bridge builds command lines and classifies output
//! - **One loop, many jobs** - the read-dispatch loop never blocks on a
//!   download; each job owns its process handle and output cursors
//! - **Faults become events** - everything below the loop is caught at its
//!   origin and reported on the wire; only channel corruption is fatal
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytdlp_bridge::{Bridge, Config};
//!
//! #[tokio::main]
//! async fn main() -> ytdlp_bridge::Result<()> {
//!     let bridge = Bridge::new(Config::from_env(), tokio::io::stdout());
//!     bridge.run(tokio::io::stdin()).await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Top-level read-dispatch loop
pub mod bridge;
/// Configuration types
pub mod config;
/// Request-to-handler routing
pub mod dispatcher;
/// Error types
pub mod error;
/// Length-prefixed frame codec
pub mod framing;
/// Supervised download execution
pub mod job;
/// Native messaging manifest store
pub mod manifest;
/// Status-line classification
pub mod progress;
/// Wire message and event types
pub mod types;
/// External downloader collaborator
pub mod ytdlp;

// Re-export commonly used types
pub use bridge::Bridge;
pub use config::{Config, ManifestConfig, ToolConfig};
pub use error::{Error, FrameError, Result};
pub use framing::EventSink;
pub use job::DownloadJob;
pub use manifest::ManifestUpdate;
pub use progress::classify;
pub use types::{
    Availability, ExtraArgs, FormatDescriptor, FormatInventory, InboundMessage, JobEvent,
    OutboundEvent, PlainError,
};
pub use ytdlp::{CliTool, ToolBackend};
