//! Top-level read-dispatch loop
//!
//! The bridge's whole lifetime is one channel's open duration: it starts
//! when the host launches it and ends when the input side closes (clean) or
//! an unrecoverable decode/dispatch fault occurs (fatal). In-flight
//! download jobs are abandoned on shutdown, matching the host's own
//! process-teardown semantics.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::framing::{EventSink, read_frame};
use crate::types::{InboundMessage, OutboundEvent};
use crate::ytdlp::{CliTool, ToolBackend};

/// The bridge process core: reads frames until the channel closes
pub struct Bridge {
    dispatcher: Dispatcher,
    sink: EventSink,
}

impl Bridge {
    /// Bridge over the CLI downloader, writing frames to `writer`.
    pub fn new<W>(config: Config, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let tool: Arc<dyn ToolBackend> = Arc::new(CliTool::new(config.tool.clone()));
        Self::with_backend(tool, config, writer)
    }

    /// Bridge over a custom tool backend.
    pub fn with_backend<W>(tool: Arc<dyn ToolBackend>, config: Config, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let sink = EventSink::new(writer);
        let dispatcher = Dispatcher::new(tool, Arc::new(config), sink.clone());
        Self { dispatcher, sink }
    }

    /// Run the read-dispatch loop until `reader` closes.
    ///
    /// Returns `Ok(())` on clean channel closure. A framing fault, a
    /// malformed JSON payload, or a failed reply write is reported once as
    /// a final `error` event on a best-effort basis and handed back as the
    /// fatal error — the caller maps it to a non-zero exit.
    pub async fn run<R>(&self, mut reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let payload = match read_frame(&mut reader).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::info!("input channel closed, shutting down");
                    return Ok(());
                }
                Err(error) => return self.fail(error).await,
            };

            let message = match InboundMessage::from_payload(&payload) {
                Ok(message) => message,
                Err(error) => return self.fail(error).await,
            };

            if let Err(error) = self.dispatcher.dispatch(message).await {
                return self.fail(error).await;
            }
        }
    }

    /// Report a fatal fault on the wire (best effort) and hand it back.
    async fn fail(&self, error: Error) -> Result<()> {
        tracing::error!(error = %error, "bridge terminating on unrecoverable fault");
        let event = OutboundEvent::job_error(format!("Bridge error: {error}"));
        if let Err(write_error) = self.sink.emit(&event).await {
            tracing::warn!(error = %write_error, "could not report the fault to the extension");
        }
        Err(error)
    }
}
