//! Keep-alive request.

use copycat_protocol_core::{BufferInput, BufferOutput, ProtocolResult, Serializer};

use crate::error::{BuildError, non_negative, positive};
use crate::message::{Message, MessageBuilder, Request, RequestEnvelope, decoded};

/// Periodic request that keeps a session from expiring.
///
/// Also acknowledges the highest command sequence number and event index the
/// client has seen, so the cluster can release state it no longer needs.
///
/// ```text
/// [envelope][session:long][command_sequence:long][event_index:long]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeepAliveRequest {
    envelope: RequestEnvelope,
    session: i64,
    command_sequence: i64,
    event_index: i64,
}

impl KeepAliveRequest {
    pub fn builder() -> KeepAliveRequestBuilder {
        KeepAliveRequestBuilder::default()
    }

    pub fn session(&self) -> i64 {
        self.session
    }

    /// Returns the highest command sequence number the client has received a
    /// response for.
    pub fn command_sequence(&self) -> i64 {
        self.command_sequence
    }

    /// Returns the highest event index the client has received.
    pub fn event_index(&self) -> i64 {
        self.event_index
    }
}

impl Message for KeepAliveRequest {
    const NAME: &'static str = "keep-alive";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        buffer.write_long(self.session)?;
        buffer.write_long(self.command_sequence)?;
        buffer.write_long(self.event_index)?;
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = RequestEnvelope::read_from(buffer)?;
        let session = buffer.read_long()?;
        let command_sequence = buffer.read_long()?;
        let event_index = buffer.read_long()?;

        let request = KeepAliveRequest::builder()
            .with_session(session)
            .and_then(|b| b.with_command_sequence(command_sequence))
            .and_then(|b| b.with_event_index(event_index))
            .and_then(KeepAliveRequestBuilder::build)
            .map(|request| KeepAliveRequest { envelope, ..request });
        decoded(Self::NAME, request)
    }
}

impl Request for KeepAliveRequest {
    type Builder = KeepAliveRequestBuilder;

    fn builder() -> Self::Builder {
        KeepAliveRequest::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        KeepAliveRequestBuilder {
            session: Some(self.session),
            command_sequence: self.command_sequence,
            event_index: self.event_index,
        }
    }

    fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for KeepAliveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeepAliveRequest[session={}, command_sequence={}, event_index={}]",
            self.session, self.command_sequence, self.event_index
        )
    }
}

/// Builder for [`KeepAliveRequest`].
///
/// `session` is required; the sequence and event index default to `0`.
#[derive(Clone, Debug, Default)]
pub struct KeepAliveRequestBuilder {
    session: Option<i64>,
    command_sequence: i64,
    event_index: i64,
}

impl KeepAliveRequestBuilder {
    pub fn with_session(mut self, session: i64) -> Result<Self, BuildError> {
        self.session = Some(positive("session", session)?);
        Ok(self)
    }

    pub fn with_command_sequence(mut self, sequence: i64) -> Result<Self, BuildError> {
        self.command_sequence = non_negative("command_sequence", sequence)?;
        Ok(self)
    }

    pub fn with_event_index(mut self, index: i64) -> Result<Self, BuildError> {
        self.event_index = non_negative("event_index", index)?;
        Ok(self)
    }

    pub fn build(self) -> Result<KeepAliveRequest, BuildError> {
        let session = self.session.ok_or_else(|| BuildError::missing("session"))?;
        Ok(KeepAliveRequest {
            envelope: RequestEnvelope,
            session,
            command_sequence: self.command_sequence,
            event_index: self.event_index,
        })
    }
}

impl MessageBuilder for KeepAliveRequestBuilder {
    type Output = KeepAliveRequest;

    fn build(self) -> Result<KeepAliveRequest, BuildError> {
        KeepAliveRequestBuilder::build(self)
    }
}
