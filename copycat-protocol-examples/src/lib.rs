use std::net::SocketAddr;

use bytes::{Buf, Bytes, BytesMut};
use copycat_protocol::codec::{AnyRequest, AnyResponse};
use copycat_protocol::copycat_protocol_core::{
    DecodeError, Frame, ProtocolError, Serializer, read_frame,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Returns the server address from PORT env var, defaulting to 5000.
pub fn server_addr() -> anyhow::Result<SocketAddr> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".into());
    Ok(format!("127.0.0.1:{port}").parse()?)
}

/// A byte stream carrying kind-tagged frames.
///
/// Incoming bytes are buffered until a whole frame is available.
pub struct FramedStream<S> {
    stream: S,
    buffer: BytesMut,
    serializer: Serializer,
}

impl<S: AsyncRead + AsyncWrite + Unpin> FramedStream<S> {
    pub fn new(stream: S, serializer: Serializer) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            serializer,
        }
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Read the next frame, or `None` once the peer closed the stream cleanly.
    pub async fn read_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        loop {
            let mut pending = &self.buffer[..];
            match read_frame(&mut pending, &self.serializer) {
                Ok(frame) => {
                    let consumed = self.buffer.len() - pending.len();
                    self.buffer.advance(consumed);
                    return Ok(Some(frame));
                }
                // incomplete frame
                Err(ProtocolError::Decode(DecodeError::Underflow { .. })) => {}
                Err(err) => return Err(err.into()),
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                anyhow::bail!(
                    "connection closed with {} unread bytes",
                    self.buffer.len()
                );
            }
        }
    }

    /// Read the next request.
    ///
    /// A frame that does not decode as a request is an error: the peer would
    /// otherwise wait forever for a response to it.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<AnyRequest>> {
        let Some(frame) = self.read_frame().await? else {
            return Ok(None);
        };
        let request = AnyRequest::from_frame(&frame, &self.serializer).map_err(|err| {
            tracing::warn!(kind = frame.kind(), error = %err, "undecodable request frame");
            err
        })?;
        Ok(Some(request))
    }

    /// Read the next response.
    pub async fn read_response(&mut self) -> anyhow::Result<Option<AnyResponse>> {
        let Some(frame) = self.read_frame().await? else {
            return Ok(None);
        };
        Ok(Some(AnyResponse::from_frame(&frame, &self.serializer)?))
    }

    /// Write an already framed message.
    pub async fn write_frame(&mut self, frame: Bytes) -> anyhow::Result<()> {
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Encode a counter value as a command or query result.
pub fn encode_counter(value: i64) -> Bytes {
    Bytes::copy_from_slice(&value.to_be_bytes())
}

/// Decode a counter value written by [`encode_counter`].
pub fn decode_counter(mut result: Bytes) -> anyhow::Result<i64> {
    if result.len() != 8 {
        anyhow::bail!("expected 8 result bytes, got {}", result.len());
    }
    Ok(result.get_i64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use copycat_protocol::copycat_protocol_core::wrap_frame;
    use copycat_protocol::prelude::*;
    use tokio::io::{DuplexStream, duplex};

    fn framed(stream: DuplexStream) -> FramedStream<DuplexStream> {
        FramedStream::new(stream, Serializer::new())
    }

    fn keep_alive_frame(session: i64) -> Bytes {
        KeepAliveRequest::builder()
            .with_session(session)
            .unwrap()
            .build()
            .unwrap()
            .to_frame(&Serializer::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_frame_split_across_writes() {
        let (local, mut peer) = duplex(256);
        let mut stream = framed(local);
        let frame = keep_alive_frame(7);
        let (head, tail) = frame.split_at(6);

        peer.write_all(head).await.unwrap();
        let (read, ()) = tokio::join!(stream.read_request(), async {
            tokio::task::yield_now().await;
            peer.write_all(tail).await.unwrap();
        });

        let Some(AnyRequest::KeepAlive(request)) = read.unwrap() else {
            panic!("expected a keep-alive request");
        };
        assert_eq!(request.session(), 7);
    }

    #[tokio::test]
    async fn test_two_frames_in_one_write() {
        let (local, mut peer) = duplex(256);
        let mut stream = framed(local);

        let mut both = BytesMut::new();
        both.extend_from_slice(&keep_alive_frame(1));
        both.extend_from_slice(&keep_alive_frame(2));
        peer.write_all(&both).await.unwrap();
        drop(peer);

        let first = stream.read_frame().await.unwrap().unwrap();
        let second = stream.read_frame().await.unwrap().unwrap();
        assert_eq!(first.kind(), "keep-alive");
        assert_ne!(first.payload(), second.payload());
        assert!(stream.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clean_eof() {
        let (local, peer) = duplex(64);
        let mut stream = framed(local);
        drop(peer);

        assert!(stream.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_mid_frame() {
        let (local, mut peer) = duplex(64);
        let mut stream = framed(local);
        peer.write_all(&keep_alive_frame(1)[..5]).await.unwrap();
        drop(peer);

        let err = stream.read_frame().await.unwrap_err();
        assert!(err.to_string().contains("5 unread bytes"));
    }

    #[tokio::test]
    async fn test_undecodable_request_is_an_error() {
        let (local, mut peer) = duplex(64);
        let mut stream = framed(local);
        let frame = wrap_frame("publish", Bytes::new(), &Serializer::new()).unwrap();
        peer.write_all(&frame).await.unwrap();

        let err = stream.read_request().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProtocolError>(),
            Some(&ProtocolError::UnknownKind("publish".to_owned()))
        );
    }

    #[test]
    fn test_counter_codec() {
        assert_eq!(decode_counter(encode_counter(42)).unwrap(), 42);
        assert!(decode_counter(Bytes::from_static(b"short")).is_err());
    }
}
