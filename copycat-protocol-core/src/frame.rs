//! Kind-tagged message framing.
//!
//! An encoded message travels inside a frame that names its kind so the
//! receiver can pick the matching decoder:
//!
//! ```text
//! [kind:string][length:4][payload:length]
//! ```
//!
//! `kind` uses the same string encoding as message fields and `length` is a
//! big-endian `u32`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::buffer::{BufferInput, BufferOutput};
use crate::error::{DecodeError, EncodeError, ProtocolError, ProtocolResult};
use crate::serializer::Serializer;

/// Size of the payload length prefix.
pub const FRAME_LENGTH_SIZE: usize = 4;

/// A decoded frame: message kind plus the still-encoded message payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    kind: String,
    payload: Bytes,
}

impl Frame {
    /// Create a frame from a kind name and an encoded payload.
    pub fn new<S: Into<String>>(kind: S, payload: Bytes) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Get the message kind name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the encoded payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consume the frame, returning the encoded payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Size of this frame on the wire.
    pub fn encoded_len(&self) -> usize {
        // presence flag + u16 length + kind bytes
        3 + self.kind.len() + FRAME_LENGTH_SIZE + self.payload.len()
    }

    /// Encode this frame, enforcing the send limit.
    pub fn encode(&self, serializer: &Serializer) -> ProtocolResult<Bytes> {
        let size = self.encoded_len();
        serializer.limits().check_send_size(size)?;
        if self.payload.len() > u32::MAX as usize {
            return Err(EncodeError::BytesTooLong {
                len: self.payload.len(),
                max: u32::MAX as usize,
            }
            .into());
        }

        let mut out = BytesMut::with_capacity(size);
        out.write_string(&self.kind)?;
        out.put_u32(self.payload.len() as u32);
        out.put_slice(&self.payload);
        Ok(out.freeze())
    }
}

/// Wrap an encoded payload in a frame tagged with `kind`.
pub fn wrap_frame(kind: &str, payload: Bytes, serializer: &Serializer) -> ProtocolResult<Bytes> {
    Frame::new(kind, payload).encode(serializer)
}

/// Read exactly one frame from `buf`, enforcing the receive limit.
///
/// Bytes after the frame are left in `buf`.
///
/// # Errors
/// Returns [`ProtocolError::Decode`] if the header or payload is truncated and
/// [`ProtocolError::MessageTooLarge`] if the declared size exceeds the limit.
pub fn read_frame<B: Buf>(buf: &mut B, serializer: &Serializer) -> ProtocolResult<Frame> {
    let kind = buf.read_required_string("kind")?;

    if buf.remaining() < FRAME_LENGTH_SIZE {
        return Err(DecodeError::Underflow {
            context: "frame length",
            needed: FRAME_LENGTH_SIZE,
            remaining: buf.remaining(),
        }
        .into());
    }
    let length = buf.get_u32() as usize;

    let size = 3 + kind.len() + FRAME_LENGTH_SIZE + length;
    if let Err(err) = serializer.limits().check_receive_size(size) {
        tracing::debug!(
            target: "copycat_protocol",
            kind = %kind,
            size,
            "rejecting oversized frame"
        );
        return Err(err);
    }

    if buf.remaining() < length {
        return Err(ProtocolError::Decode(DecodeError::Underflow {
            context: "frame payload",
            needed: length,
            remaining: buf.remaining(),
        }));
    }
    let payload = buf.copy_to_bytes(length);

    tracing::trace!(target: "copycat_protocol", kind = %kind, length, "read frame");
    Ok(Frame { kind, payload })
}
