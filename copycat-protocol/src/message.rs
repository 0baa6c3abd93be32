//! The message contract shared by every request and response.
//!
//! Every message:
//! - is built through a builder that validates each setter eagerly and
//!   re-checks required fields in `build()`,
//! - encodes its envelope first and then its own fields, in a fixed order,
//! - decodes the same fields in the same order back into an equal value.
//!
//! ```text
//! request:  [envelope][message fields...]
//! response: [status:1][error:1 if status = error][message fields... if status = ok]
//! ```

use bytes::{Buf, Bytes, BytesMut};
use copycat_protocol_core::{
    BufferInput, BufferOutput, DecodeError, ErrorKind, ProtocolError, ProtocolResult, Serializer,
    wrap_frame,
};
use serde::Serialize;

use crate::error::BuildError;

/// A message of the protocol family.
pub trait Message: Clone + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static {
    /// Message kind name, used to dispatch frames to the right decoder.
    const NAME: &'static str;

    /// Write this message's envelope and fields to `buffer`, in wire order.
    ///
    /// Implementations may leave a partial message behind on error; callers
    /// go through [`Message::write_object`] or [`Message::encode`].
    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        serializer: &Serializer,
    ) -> ProtocolResult<()>;

    /// Read a message written by [`Message::write_object`].
    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        serializer: &Serializer,
    ) -> ProtocolResult<Self>;

    /// Append this message to `buffer`.
    ///
    /// Either the whole message is written or, on error, `buffer` is left
    /// unchanged.
    fn write_object<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        serializer: &Serializer,
    ) -> ProtocolResult<()> {
        let encoded = self.encode(serializer)?;
        buffer.write_slice(&encoded)?;
        Ok(())
    }

    /// Encode this message into a standalone payload.
    fn encode(&self, serializer: &Serializer) -> ProtocolResult<Bytes> {
        let mut buffer = BytesMut::new();
        self.write_fields(&mut buffer, serializer)?;
        Ok(buffer.freeze())
    }

    /// Decode a payload produced by [`Message::encode`].
    ///
    /// The payload must contain exactly one message.
    fn decode<B: Buf>(mut payload: B, serializer: &Serializer) -> ProtocolResult<Self> {
        let message = Self::read_object(&mut payload, serializer)?;
        if payload.has_remaining() {
            return Err(DecodeError::TrailingBytes(payload.remaining()).into());
        }
        Ok(message)
    }

    /// Encode this message wrapped in a frame tagged with [`Message::NAME`].
    fn to_frame(&self, serializer: &Serializer) -> ProtocolResult<Bytes> {
        wrap_frame(Self::NAME, self.encode(serializer)?, serializer)
    }
}

/// Terminal step of every message builder.
pub trait MessageBuilder {
    /// The message produced by this builder.
    type Output: Message;

    /// Validate required fields and produce the immutable message.
    fn build(self) -> Result<Self::Output, BuildError>;
}

/// A request sent by a client.
pub trait Request: Message {
    type Builder: MessageBuilder<Output = Self>;

    /// Returns a new, empty builder.
    fn builder() -> Self::Builder;

    /// Returns a builder pre-populated from this request.
    fn to_builder(&self) -> Self::Builder;

    /// Returns the common request envelope.
    fn envelope(&self) -> &RequestEnvelope;
}

/// A response sent by a server.
pub trait Response: Message {
    type Builder: MessageBuilder<Output = Self>;

    /// Returns a new, empty builder.
    fn builder() -> Self::Builder;

    /// Returns a builder pre-populated from this response.
    fn to_builder(&self) -> Self::Builder;

    /// Returns the common response envelope.
    fn envelope(&self) -> &ResponseEnvelope;

    /// Returns the response status.
    fn status(&self) -> ResponseStatus {
        self.envelope().status()
    }

    /// Returns the error kind of a failed response.
    fn error(&self) -> Option<ErrorKind> {
        self.envelope().error_kind()
    }
}

/// Fields common to every request.
///
/// Requests carry no common fields yet. The envelope still has its own place
/// at the front of the encoding so fields added here keep a stable position
/// ahead of message-specific fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RequestEnvelope;

impl RequestEnvelope {
    pub fn write_to<B: BufferOutput + ?Sized>(&self, _buffer: &mut B) -> ProtocolResult<()> {
        Ok(())
    }

    pub fn read_from<B: BufferInput + ?Sized>(_buffer: &mut B) -> ProtocolResult<Self> {
        Ok(RequestEnvelope)
    }
}

/// Outcome of a request, as reported by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Error = 0,
    Ok = 1,
}

impl ResponseStatus {
    /// Get the wire id of this status.
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Look up a status by wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ResponseStatus::Error),
            1 => Some(ResponseStatus::Ok),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Error => "error",
            ResponseStatus::Ok => "ok",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields common to every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResponseEnvelope {
    status: ResponseStatus,
    error: Option<ErrorKind>,
}

impl ResponseEnvelope {
    /// A successful envelope.
    pub fn ok() -> Self {
        Self {
            status: ResponseStatus::Ok,
            error: None,
        }
    }

    /// A failed envelope, optionally naming the error kind.
    pub fn failure(kind: Option<ErrorKind>) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: kind,
        }
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns the error kind. Always `None` for successful envelopes.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    pub fn write_to<B: BufferOutput + ?Sized>(&self, buffer: &mut B) -> ProtocolResult<()> {
        buffer.write_byte(self.status.id())?;
        if self.status == ResponseStatus::Error {
            buffer.write_byte(self.error.map_or(0, |kind| kind.id()))?;
        }
        Ok(())
    }

    pub fn read_from<B: BufferInput + ?Sized>(buffer: &mut B) -> ProtocolResult<Self> {
        let id = buffer.read_byte()?;
        let status = ResponseStatus::from_id(id).ok_or(DecodeError::UnknownId {
            kind: "status",
            id,
        })?;
        if status == ResponseStatus::Ok {
            return Ok(Self::ok());
        }

        let id = buffer.read_byte()?;
        if id == 0 {
            return Ok(Self::failure(None));
        }
        let kind = ErrorKind::from_id(id).ok_or(DecodeError::UnknownId {
            kind: "error",
            id,
        })?;
        Ok(Self::failure(Some(kind)))
    }
}

impl std::fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status={}", self.status)?;
        if let Some(kind) = self.error {
            write!(f, ", error={kind}")?;
        }
        Ok(())
    }
}

/// Status setters shared by every response builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct EnvelopeSlot(Option<ResponseEnvelope>);

impl EnvelopeSlot {
    pub(crate) fn from_envelope(envelope: ResponseEnvelope) -> Self {
        Self(Some(envelope))
    }

    pub(crate) fn set_status(&mut self, status: ResponseStatus) {
        self.0 = Some(match status {
            ResponseStatus::Ok => ResponseEnvelope::ok(),
            ResponseStatus::Error => ResponseEnvelope::failure(None),
        });
    }

    pub(crate) fn set_error(&mut self, kind: ErrorKind) {
        self.0 = Some(ResponseEnvelope::failure(Some(kind)));
    }

    pub(crate) fn take(self) -> Result<ResponseEnvelope, BuildError> {
        self.0.ok_or_else(|| BuildError::missing("status"))
    }
}

/// Map a builder failure on decoded fields to a decode error.
pub(crate) fn decoded<M>(name: &'static str, result: Result<M, BuildError>) -> ProtocolResult<M> {
    result.map_err(|err| {
        tracing::debug!(
            target: "copycat_protocol",
            kind = name,
            error = %err,
            "decoded fields violate message invariants"
        );
        ProtocolError::Decode(DecodeError::InvalidMessage(err.to_string()))
    })
}
