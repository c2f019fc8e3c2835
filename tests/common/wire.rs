//! Client-side frame codec for end-to-end tests
//!
//! Deliberately reimplemented instead of reusing the library's codec, so
//! these tests pin the wire format itself: 4-byte native-endian length
//! prefix, UTF-8 JSON payload.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Send one JSON message as a frame.
pub async fn send<W>(writer: &mut W, message: serde_json::Value)
where
    W: AsyncWrite + Unpin,
{
    let payload = message.to_string();
    let bytes = payload.as_bytes();
    let length = u32::try_from(bytes.len()).expect("test payload fits in u32");
    writer.write_all(&length.to_ne_bytes()).await.expect("write prefix");
    writer.write_all(bytes).await.expect("write payload");
    writer.flush().await.expect("flush frame");
}

/// Receive one frame and decode it as JSON; `None` on clean closure.
pub async fn recv<R>(reader: &mut R) -> Option<serde_json::Value>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return None,
        Err(e) => panic!("frame prefix read failed: {e}"),
    }
    let mut payload = vec![0u8; u32::from_ne_bytes(prefix) as usize];
    reader.read_exact(&mut payload).await.expect("read payload");
    Some(serde_json::from_slice(&payload).expect("frame payload is JSON"))
}
