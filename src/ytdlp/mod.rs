//! External downloader collaborator
//!
//! Everything that talks to the yt-dlp executable short of a download job:
//! locating the binary, probing availability, and enumerating formats.
//! The [`ToolBackend`] trait is the seam; [`CliTool`] is the production
//! implementation, and tests substitute scripted backends.

mod cli;
mod traits;

pub use cli::CliTool;
pub use traits::ToolBackend;
