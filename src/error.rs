//! Error types for ytdlp-bridge
//!
//! The taxonomy follows the propagation policy of the bridge: faults below
//! the top-level loop are caught at their origin and converted to outbound
//! events, so the variants here cover the few conditions that terminate the
//! loop (framing faults, malformed payloads, a broken output channel) plus
//! the manifest store's reportable failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ytdlp-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytdlp-bridge
#[derive(Debug, Error)]
pub enum Error {
    /// Framing-level fault on the native messaging channel. Fatal: the loop
    /// does not attempt to resynchronize a corrupted channel.
    #[error("channel error: {0}")]
    Frame(#[from] FrameError),

    /// A frame payload that is not valid JSON, or an event that failed to
    /// serialize. Fatal at the loop level.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error outside the framing layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The native messaging manifest does not exist. The bridge updates an
    /// installed manifest; it never creates one.
    #[error("Manifest file not found at {}", .path.display())]
    ManifestMissing {
        /// Where the manifest was expected
        path: PathBuf,
    },

    /// Manifest read, parse, or write failure
    #[error("{0}")]
    Manifest(String),
}

/// Faults raised by the length-prefixed frame codec
#[derive(Debug, Error)]
pub enum FrameError {
    /// The channel closed partway through a length prefix or payload.
    /// Distinct from clean closure, which only happens at a frame boundary.
    #[error("channel closed mid-frame: expected {expected} bytes, got {got}")]
    Truncated {
        /// Bytes the frame declared
        expected: usize,
        /// Bytes actually available before closure
        got: usize,
    },

    /// Payload bytes are not valid UTF-8
    #[error("frame payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A payload too large to describe with the 4-byte length prefix
    #[error("frame payload of {len} bytes exceeds the u32 length prefix")]
    Oversized {
        /// Byte length of the rejected payload
        len: usize,
    },

    /// I/O error on the frame channel
    #[error("I/O error on the frame channel: {0}")]
    Io(#[from] std::io::Error),
}
