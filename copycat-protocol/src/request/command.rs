//! Command request.

use bytes::Bytes;
use copycat_protocol_core::{BufferInput, BufferOutput, ProtocolResult, Serializer};

use crate::error::{BuildError, non_negative, positive};
use crate::message::{Message, MessageBuilder, Request, RequestEnvelope, decoded};

/// Request to apply a state-changing operation through a session.
///
/// The operation is carried as opaque bytes; interpreting them belongs to the
/// state machine bound to the session.
///
/// ```text
/// [envelope][session:long][sequence:long][operation:bytes]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandRequest {
    envelope: RequestEnvelope,
    session: i64,
    sequence: i64,
    operation: Bytes,
}

impl CommandRequest {
    pub fn builder() -> CommandRequestBuilder {
        CommandRequestBuilder::default()
    }

    pub fn session(&self) -> i64 {
        self.session
    }

    /// Returns the client-assigned command sequence number.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Returns the encoded operation.
    pub fn operation(&self) -> &Bytes {
        &self.operation
    }
}

impl Message for CommandRequest {
    const NAME: &'static str = "command";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        buffer.write_long(self.session)?;
        buffer.write_long(self.sequence)?;
        buffer.write_bytes(&self.operation)?;
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = RequestEnvelope::read_from(buffer)?;
        let session = buffer.read_long()?;
        let sequence = buffer.read_long()?;
        let operation = buffer.read_bytes()?;

        let request = CommandRequest::builder()
            .with_session(session)
            .and_then(|b| b.with_sequence(sequence))
            .map(|b| b.with_operation(operation))
            .and_then(CommandRequestBuilder::build)
            .map(|request| CommandRequest { envelope, ..request });
        decoded(Self::NAME, request)
    }
}

impl Request for CommandRequest {
    type Builder = CommandRequestBuilder;

    fn builder() -> Self::Builder {
        CommandRequest::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        CommandRequestBuilder {
            session: Some(self.session),
            sequence: self.sequence,
            operation: Some(self.operation.clone()),
        }
    }

    fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CommandRequest[session={}, sequence={}, operation={} bytes]",
            self.session,
            self.sequence,
            self.operation.len()
        )
    }
}

/// Builder for [`CommandRequest`].
///
/// `session` and `operation` are required.
#[derive(Clone, Debug, Default)]
pub struct CommandRequestBuilder {
    session: Option<i64>,
    sequence: i64,
    operation: Option<Bytes>,
}

impl CommandRequestBuilder {
    pub fn with_session(mut self, session: i64) -> Result<Self, BuildError> {
        self.session = Some(positive("session", session)?);
        Ok(self)
    }

    pub fn with_sequence(mut self, sequence: i64) -> Result<Self, BuildError> {
        self.sequence = non_negative("sequence", sequence)?;
        Ok(self)
    }

    pub fn with_operation<T: Into<Bytes>>(mut self, operation: T) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn build(self) -> Result<CommandRequest, BuildError> {
        let session = self.session.ok_or_else(|| BuildError::missing("session"))?;
        let operation = self
            .operation
            .ok_or_else(|| BuildError::missing("operation"))?;
        Ok(CommandRequest {
            envelope: RequestEnvelope,
            session,
            sequence: self.sequence,
            operation,
        })
    }
}

impl MessageBuilder for CommandRequestBuilder {
    type Output = CommandRequest;

    fn build(self) -> Result<CommandRequest, BuildError> {
        CommandRequestBuilder::build(self)
    }
}
