//! Close session request.

use copycat_protocol_core::{BufferInput, BufferOutput, ProtocolResult, Serializer};

use crate::error::{BuildError, positive};
use crate::message::{Message, MessageBuilder, Request, RequestEnvelope, decoded};

/// Request to close (unregister) an open session.
///
/// ```text
/// [envelope][session:long]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CloseSessionRequest {
    envelope: RequestEnvelope,
    session: i64,
}

impl CloseSessionRequest {
    pub fn builder() -> CloseSessionRequestBuilder {
        CloseSessionRequestBuilder::default()
    }

    /// Returns the session identifier.
    pub fn session(&self) -> i64 {
        self.session
    }
}

impl Message for CloseSessionRequest {
    const NAME: &'static str = "close-session";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        buffer.write_long(self.session)?;
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = RequestEnvelope::read_from(buffer)?;
        let session = buffer.read_long()?;
        decoded(
            Self::NAME,
            CloseSessionRequest::builder()
                .with_session(session)
                .and_then(CloseSessionRequestBuilder::build)
                .map(|request| CloseSessionRequest { envelope, ..request }),
        )
    }
}

impl Request for CloseSessionRequest {
    type Builder = CloseSessionRequestBuilder;

    fn builder() -> Self::Builder {
        CloseSessionRequest::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        CloseSessionRequestBuilder {
            session: Some(self.session),
        }
    }

    fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for CloseSessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CloseSessionRequest[session={}]", self.session)
    }
}

/// Builder for [`CloseSessionRequest`].
#[derive(Clone, Debug, Default)]
pub struct CloseSessionRequestBuilder {
    session: Option<i64>,
}

impl CloseSessionRequestBuilder {
    /// Set the session identifier. Must be positive.
    pub fn with_session(mut self, session: i64) -> Result<Self, BuildError> {
        self.session = Some(positive("session", session)?);
        Ok(self)
    }

    pub fn build(self) -> Result<CloseSessionRequest, BuildError> {
        let session = self.session.ok_or_else(|| BuildError::missing("session"))?;
        Ok(CloseSessionRequest {
            envelope: RequestEnvelope,
            session,
        })
    }
}

impl MessageBuilder for CloseSessionRequestBuilder {
    type Output = CloseSessionRequest;

    fn build(self) -> Result<CloseSessionRequest, BuildError> {
        CloseSessionRequestBuilder::build(self)
    }
}
