//! Core message and event types for the native messaging wire
//!
//! Inbound messages select an operation through their `type` field; outbound
//! events reproduce the extension's expected shapes exactly, which means a
//! mix of type-tagged lifecycle events ([`JobEvent`]) and untagged reply
//! bodies (availability, format inventories, bare errors).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Extra downloader arguments from the extension.
///
/// Accepted as either a single space-delimited string or an explicit list;
/// both forms flatten to the same token vector.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExtraArgs {
    /// One space-delimited string of arguments
    Joined(String),
    /// Explicit argument list
    List(Vec<String>),
}

impl ExtraArgs {
    /// Flatten into individual argument tokens
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ExtraArgs::Joined(joined) => joined.split_whitespace().map(str::to_string).collect(),
            ExtraArgs::List(list) => list,
        }
    }
}

/// One decoded request from the extension.
///
/// Operation fields default to empty when absent — required-field
/// validation is the dispatcher's job and produces reportable events, not
/// deserialization faults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Probe whether the downloader is installed and working
    #[serde(rename = "check")]
    Check,

    /// Enumerate selectable formats for a URL
    #[serde(rename = "getFormats")]
    GetFormats {
        /// Media page URL
        #[serde(default)]
        url: String,
    },

    /// Start a download job
    #[serde(rename = "download")]
    Download {
        /// Media page URL
        #[serde(default)]
        url: String,
        /// Output path template handed to the tool's `-o` flag
        #[serde(default)]
        output: String,
        /// Format selector (defaults to `best`)
        #[serde(default = "default_format")]
        format: String,
        /// Caller-supplied extra arguments
        #[serde(default)]
        args: Option<ExtraArgs>,
    },

    /// Rewrite the native messaging manifest's allowed-extensions list
    #[serde(rename = "updateManifest")]
    UpdateManifest {
        /// Browser extension identifier
        #[serde(default, rename = "extensionId")]
        extension_id: String,
    },

    /// Any operation tag outside the known set (including a missing tag)
    #[serde(skip)]
    Unknown {
        /// The unrecognized tag, verbatim
        tag: String,
    },
}

impl InboundMessage {
    /// Decode one frame payload.
    ///
    /// Unknown operation tags map to [`InboundMessage::Unknown`] so the
    /// dispatcher can report them without killing the loop. Malformed JSON
    /// and type-mismatched fields on a known tag are channel faults.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(payload)?;
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        match tag {
            "check" | "getFormats" | "download" | "updateManifest" => {
                Ok(serde_json::from_value(value)?)
            }
            other => Ok(InboundMessage::Unknown {
                tag: other.to_string(),
            }),
        }
    }
}

fn default_format() -> String {
    "best".to_string()
}

/// Availability report for the external downloader (`check` reply)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Availability {
    /// Whether a working executable was found
    pub available: bool,
    /// Reported `--version` string, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Resolved executable path, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Why the tool is unavailable, when it is not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One selectable stream variant, mapped from the downloader's JSON metadata.
/// Immutable once produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormatDescriptor {
    /// Format selector id
    pub id: String,
    /// Container extension
    pub ext: String,
    /// Human-readable resolution label (`unknown` when unreported)
    pub resolution: String,
    /// Frame width in pixels
    pub width: Option<u32>,
    /// Frame height in pixels
    pub height: Option<u32>,
    /// Frame rate
    pub fps: Option<f64>,
    /// Video codec identifier (`none` for audio-only variants)
    pub vcodec: String,
    /// Audio codec identifier (`none` for video-only variants)
    pub acodec: String,
    /// File size estimate in bytes
    pub filesize: Option<u64>,
    /// Total bitrate estimate
    pub tbr: Option<f64>,
    /// Free-text note from the tool
    pub format_note: String,
}

/// Successful format enumeration reply
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormatInventory {
    /// Always true on this shape; failures use the bare error reply
    pub success: bool,
    /// Selectable formats, possibly empty
    pub formats: Vec<FormatDescriptor>,
    /// Media title (`Unknown` when unreported)
    pub title: String,
}

/// Bare `{error}` reply body, used where the extension expects a reply
/// without a `type` tag (format-query failures, unknown operations)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlainError {
    /// Diagnostic text
    pub error: String,
}

/// Type-tagged lifecycle events (`type` field on the wire)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JobEvent {
    /// A download job is about to spawn; carries the assembled command line
    Started {
        /// Full command line, space-joined
        command: String,
    },

    /// Download progress extracted from one tool status line
    Progress {
        /// Percent complete, 0.0 to 100.0
        percent: f64,
        /// Total size string as printed by the tool
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<String>,
        /// Transfer speed string as printed by the tool
        #[serde(skip_serializing_if = "Option::is_none")]
        speed: Option<String>,
        /// Estimated time remaining as printed by the tool
        #[serde(skip_serializing_if = "Option::is_none")]
        eta: Option<String>,
    },

    /// Free-text status worth surfacing (destination, merge chatter)
    Info {
        /// Human-readable status line
        message: String,
    },

    /// Terminal success for a download job
    Completed {
        /// Output path the job was asked to write
        output: String,
    },

    /// Terminal failure for a job, or a reported non-fatal fault
    Error {
        /// Diagnostic text
        error: String,
    },

    /// The manifest store rewrote the allowed-extensions list
    #[serde(rename_all = "camelCase")]
    ManifestUpdated {
        /// Path of the rewritten manifest
        path: String,
        /// Extension id now allowed
        extension_id: String,
    },
}

/// Every frame the bridge writes back to the extension
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    /// `check` reply
    Availability(Availability),
    /// Successful `getFormats` reply
    Formats(FormatInventory),
    /// Bare `{error}` reply
    Plain(PlainError),
    /// Type-tagged lifecycle event
    Job(JobEvent),
}

impl OutboundEvent {
    /// Bare `{error}` reply
    pub fn plain_error(error: impl Into<String>) -> Self {
        OutboundEvent::Plain(PlainError {
            error: error.into(),
        })
    }

    /// Tagged `{type: "error", error}` event
    pub fn job_error(error: impl Into<String>) -> Self {
        OutboundEvent::Job(JobEvent::Error {
            error: error.into(),
        })
    }
}

impl From<JobEvent> for OutboundEvent {
    fn from(event: JobEvent) -> Self {
        OutboundEvent::Job(event)
    }
}
