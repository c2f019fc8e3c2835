//! One supervised download execution
//!
//! A job owns its process handle and output cursors exclusively; its only
//! observable result is the event stream it emits. Jobs run on their own
//! task so the bridge loop stays responsive, and every fault a job hits is
//! converted into a single terminal `error` event — nothing escapes to the
//! loop and nothing is retried.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::framing::EventSink;
use crate::progress::classify;
use crate::types::{ExtraArgs, JobEvent, OutboundEvent};

/// One download request turned into a supervised external-process run
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Media URL, passed to the tool last
    pub url: String,
    /// Output path template handed to `-o`
    pub output: String,
    /// Format selector handed to `-f`
    pub format: String,
    /// Caller-supplied extra arguments, inserted before the URL
    pub extra_args: Vec<String>,
}

impl DownloadJob {
    /// Build a job from validated request fields.
    pub fn new(url: String, output: String, format: String, args: Option<ExtraArgs>) -> Self {
        Self {
            url,
            output,
            format,
            extra_args: args.map(ExtraArgs::into_vec).unwrap_or_default(),
        }
    }

    /// Assemble the argument vector. Order is deterministic: format
    /// selector, output template, line-buffered progress, no playlist
    /// expansion, extra arguments, URL last.
    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            self.output.clone(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(self.url.clone());
        args
    }

    /// Full command line as reported in the `started` event.
    fn command_line(&self, tool: &Path) -> String {
        let mut parts = vec![tool.display().to_string()];
        parts.extend(self.args());
        parts.join(" ")
    }

    /// Run the job to completion, narrating through `sink`.
    ///
    /// The `started` event is emitted before spawning so the caller can see
    /// the assembled command even when the spawn itself fails.
    pub async fn run(self, tool: Option<PathBuf>, sink: EventSink) {
        let Some(tool) = tool else {
            self.emit(&sink, JobEvent::Error {
                error: "yt-dlp not found".to_string(),
            })
            .await;
            return;
        };

        self.emit(&sink, JobEvent::Started {
            command: self.command_line(&tool),
        })
        .await;

        let mut child = match Command::new(&tool)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                self.emit(&sink, JobEvent::Error {
                    error: format!("failed to start yt-dlp: {e}"),
                })
                .await;
                return;
            }
        };

        if let Err(error) = self.pump_output(&mut child, &sink).await {
            self.emit(&sink, JobEvent::Error { error }).await;
            return;
        }

        match child.wait().await {
            Ok(status) if status.success() => {
                tracing::debug!(url = %self.url, "download completed");
                self.emit(&sink, JobEvent::Completed {
                    output: self.output.clone(),
                })
                .await;
            }
            Ok(status) => {
                let code = status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string());
                self.emit(&sink, JobEvent::Error {
                    error: format!("Download failed with code {code}"),
                })
                .await;
            }
            Err(e) => {
                self.emit(&sink, JobEvent::Error {
                    error: format!("failed to wait for yt-dlp: {e}"),
                })
                .await;
            }
        }
    }

    /// Drain stdout and stderr line by line through the progress classifier,
    /// emitting matches immediately so the consumer sees events in the order
    /// the tool produced them.
    async fn pump_output(&self, child: &mut Child, sink: &EventSink) -> Result<(), String> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "yt-dlp stdout was not captured".to_string())?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| "yt-dlp stderr was not captured".to_string())?;

        let (out_result, err_result) = tokio::join!(
            self.pump_stream(stdout, sink),
            self.pump_stream(stderr, sink),
        );
        out_result.and(err_result)
    }

    async fn pump_stream<R>(&self, stream: R, sink: &EventSink) -> Result<(), String>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = classify(line.trim()) {
                        self.emit(sink, event).await;
                    }
                }
                Ok(None) => return Ok(()),
                Err(e) => return Err(format!("failed to read yt-dlp output: {e}")),
            }
        }
    }

    /// Emit one event, logging instead of failing when the channel is gone —
    /// a dying channel must not turn into a job panic.
    async fn emit(&self, sink: &EventSink, event: JobEvent) {
        if let Err(e) = sink.emit(&OutboundEvent::Job(event)).await {
            tracing::warn!(url = %self.url, error = %e, "failed to write job event");
        }
    }
}
