//! Length-prefixed frame codec for the native messaging channel
//!
//! Each frame is a 4-byte native-endian length followed by exactly that many
//! bytes of UTF-8 JSON, in both directions. The host browser reads frames
//! synchronously, so every write must flush before returning — an unflushed
//! frame stalls the extension indefinitely.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{FrameError, Result};
use crate::types::OutboundEvent;

/// Read one frame payload.
///
/// Returns `Ok(None)` when the channel is already closed at a frame
/// boundary — the host's clean-shutdown signal, not a failure. Closure
/// partway through the length prefix or the payload is a
/// [`FrameError::Truncated`] fault.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await.map_err(FrameError::Io)?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Truncated {
                expected: prefix.len(),
                got: filled,
            }
            .into());
        }
        filled += n;
    }

    let length = u32::from_ne_bytes(prefix) as usize;
    let mut payload = vec![0u8; length];
    let mut filled = 0;
    while filled < length {
        let n = reader.read(&mut payload[filled..]).await.map_err(FrameError::Io)?;
        if n == 0 {
            return Err(FrameError::Truncated {
                expected: length,
                got: filled,
            }
            .into());
        }
        filled += n;
    }

    let text = String::from_utf8(payload).map_err(FrameError::Utf8)?;
    Ok(Some(text))
}

/// Write one frame: length prefix, payload bytes, flush.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = payload.as_bytes();
    let length = u32::try_from(bytes.len())
        .map_err(|_| FrameError::Oversized { len: bytes.len() })?;
    writer.write_all(&length.to_ne_bytes()).await.map_err(FrameError::Io)?;
    writer.write_all(bytes).await.map_err(FrameError::Io)?;
    writer.flush().await.map_err(FrameError::Io)?;
    Ok(())
}

/// Shared writing end of the channel.
///
/// Cloned into every concurrent download job. Encoding, writing, and
/// flushing one event happen under a single mutex acquisition, so frames
/// from overlapping jobs are never interleaved mid-frame on the wire.
#[derive(Clone)]
pub struct EventSink {
    writer: Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>,
}

impl EventSink {
    /// Wrap a writer as the single outbound channel.
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Encode one event and write it as a frame.
    pub async fn emit(&self, event: &OutboundEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, &payload).await
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::io::AsyncWriteExt;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn round_trip_preserves_the_payload() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let payload = r#"{"type":"check"}"#;
        assert_ok!(write_frame(&mut client, payload).await);
        let decoded = read_frame(&mut server).await.unwrap();
        assert_eq!(decoded.as_deref(), Some(payload));
    }

    #[tokio::test]
    async fn round_trip_preserves_any_json_structure() {
        let original = serde_json::json!({
            "type": "download",
            "url": "https://example.com/видео",
            "args": ["--no-mtime", "--embed-thumbnail"],
            "nested": {"deep": [1, 2.5, null, true]}
        });
        let (mut client, mut server) = tokio::io::duplex(4096);
        assert_ok!(write_frame(&mut client, &original.to_string()).await);
        let decoded: serde_json::Value =
            serde_json::from_str(&read_frame(&mut server).await.unwrap().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn closed_channel_at_a_frame_boundary_is_clean_shutdown() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        let decoded = read_frame(&mut server).await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn partial_length_prefix_is_truncation_not_shutdown() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&[0x10, 0x00]).await.unwrap();
        drop(client);
        let error = assert_err!(read_frame(&mut server).await);
        let Error::Frame(FrameError::Truncated { expected, got }) = error else {
            panic!("expected a truncation fault, got: {error:?}");
        };
        assert_eq!(expected, 4);
        assert_eq!(got, 2);
    }

    #[tokio::test]
    async fn payload_shorter_than_declared_is_truncation() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&8u32.to_ne_bytes()).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        drop(client);
        let error = assert_err!(read_frame(&mut server).await);
        let Error::Frame(FrameError::Truncated { expected, got }) = error else {
            panic!("expected a truncation fault, got: {error:?}");
        };
        assert_eq!(expected, 8);
        assert_eq!(got, 3);
    }

    #[tokio::test]
    async fn non_utf8_payload_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&2u32.to_ne_bytes()).await.unwrap();
        client.write_all(&[0xff, 0xfe]).await.unwrap();
        let error = assert_err!(read_frame(&mut server).await);
        assert!(matches!(error, Error::Frame(FrameError::Utf8(_))));
    }

    #[tokio::test]
    async fn zero_length_frame_decodes_to_an_empty_payload() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&0u32.to_ne_bytes()).await.unwrap();
        let decoded = read_frame(&mut server).await.unwrap();
        assert_eq!(decoded.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn length_prefix_uses_native_byte_order() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, "hi").await.unwrap();
        let mut prefix = [0u8; 4];
        server.read_exact(&mut prefix).await.unwrap();
        assert_eq!(prefix, 2u32.to_ne_bytes());
    }

    #[tokio::test]
    async fn concurrent_emitters_never_interleave_frames() {
        let (server, mut client) = tokio::io::duplex(64 * 1024);
        let sink = EventSink::new(server);

        let mut writers = Vec::new();
        for job in 0..8 {
            let sink = sink.clone();
            writers.push(tokio::spawn(async move {
                for step in 0..20 {
                    let event = OutboundEvent::Job(crate::types::JobEvent::Info {
                        message: format!("job {job} step {step}").repeat(16),
                    });
                    sink.emit(&event).await.unwrap();
                }
            }));
        }
        for writer in writers {
            writer.await.unwrap();
        }
        drop(sink);

        // Every one of the 160 frames must decode as standalone JSON.
        for _ in 0..160 {
            let payload = read_frame(&mut client).await.unwrap().unwrap();
            let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
            assert_eq!(value["type"], "info");
        }
        assert!(read_frame(&mut client).await.unwrap().is_none());
    }
}
