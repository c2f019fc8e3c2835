//! Maps decoded requests onto operation handlers
//!
//! Synchronous operations (`check`, `getFormats`, `updateManifest`) reply
//! before `dispatch` returns; `download` hands its job to a fresh task and
//! returns immediately so the loop can accept the next request while the
//! download runs.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::framing::EventSink;
use crate::job::DownloadJob;
use crate::manifest;
use crate::types::{InboundMessage, JobEvent, OutboundEvent};
use crate::ytdlp::ToolBackend;

/// Routes one inbound message to its operation handler
pub struct Dispatcher {
    tool: Arc<dyn ToolBackend>,
    config: Arc<Config>,
    sink: EventSink,
}

impl Dispatcher {
    /// Create a dispatcher replying through `sink`.
    pub fn new(tool: Arc<dyn ToolBackend>, config: Arc<Config>, sink: EventSink) -> Self {
        Self { tool, config, sink }
    }

    /// Handle one message.
    ///
    /// Every operation fault is converted to an outbound event here or in
    /// the handler it delegates to; the only errors that escape are
    /// channel-level write failures, which are fatal to the loop.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<()> {
        match message {
            InboundMessage::Check => {
                let availability = self.tool.probe().await;
                tracing::debug!(available = availability.available, "availability probe");
                self.sink
                    .emit(&OutboundEvent::Availability(availability))
                    .await
            }

            InboundMessage::GetFormats { url } => {
                if url.is_empty() {
                    return self
                        .sink
                        .emit(&OutboundEvent::plain_error("No URL provided"))
                        .await;
                }
                match self.tool.query_formats(&url).await {
                    Ok(inventory) => self.sink.emit(&OutboundEvent::Formats(inventory)).await,
                    Err(error) => self.sink.emit(&OutboundEvent::plain_error(error)).await,
                }
            }

            InboundMessage::Download {
                url,
                output,
                format,
                args,
            } => {
                if url.is_empty() || output.is_empty() {
                    return self
                        .sink
                        .emit(&OutboundEvent::job_error("Missing URL or output path"))
                        .await;
                }
                let job = DownloadJob::new(url, output, format, args);
                let tool = self.tool.resolve();
                tracing::debug!(url = %job.url, "spawning download job");
                tokio::spawn(job.run(tool, self.sink.clone()));
                Ok(())
            }

            InboundMessage::UpdateManifest { extension_id } => {
                if extension_id.is_empty() {
                    return self
                        .sink
                        .emit(&OutboundEvent::job_error("No extension ID provided"))
                        .await;
                }
                let event = match manifest::update(&self.config.manifest, &extension_id).await {
                    Ok(outcome) => JobEvent::ManifestUpdated {
                        path: outcome.path.display().to_string(),
                        extension_id: outcome.extension_id,
                    },
                    // A missing manifest is reported verbatim; other store
                    // failures get the operation prefix.
                    Err(error @ Error::ManifestMissing { .. }) => JobEvent::Error {
                        error: error.to_string(),
                    },
                    Err(error) => JobEvent::Error {
                        error: format!("Failed to update manifest: {error}"),
                    },
                };
                self.sink.emit(&event.into()).await
            }

            InboundMessage::Unknown { tag } => {
                tracing::warn!(tag, "unrecognized operation");
                self.sink
                    .emit(&OutboundEvent::plain_error(format!(
                        "Unknown message type: {tag}"
                    )))
                    .await
            }
        }
    }
}
