//! Open session response.

use copycat_protocol_core::{BufferInput, BufferOutput, ErrorKind, ProtocolResult, Serializer};

use crate::error::{BuildError, non_negative, positive};
use crate::message::{
    EnvelopeSlot, Message, MessageBuilder, Response, ResponseEnvelope, ResponseStatus, decoded,
};

/// Response to an [`OpenSessionRequest`](crate::request::OpenSessionRequest).
///
/// A successful response carries the identifier the cluster assigned to the
/// session and the timeout it granted. Failed responses carry neither.
///
/// ```text
/// ok:    [0x01][session:long][timeout:long]
/// error: [0x00][error:byte]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpenSessionResponse {
    envelope: ResponseEnvelope,
    session: i64,
    timeout: i64,
}

impl OpenSessionResponse {
    pub fn builder() -> OpenSessionResponseBuilder {
        OpenSessionResponseBuilder::default()
    }

    /// Returns the registered session identifier, or `0` for failed responses.
    pub fn session(&self) -> i64 {
        self.session
    }

    /// Returns the granted session timeout in milliseconds.
    pub fn timeout(&self) -> i64 {
        self.timeout
    }
}

impl Message for OpenSessionResponse {
    const NAME: &'static str = "open-session";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        if self.envelope.is_ok() {
            buffer.write_long(self.session)?;
            buffer.write_long(self.timeout)?;
        }
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = ResponseEnvelope::read_from(buffer)?;
        let mut builder = OpenSessionResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(envelope),
            ..Default::default()
        };
        if envelope.is_ok() {
            let session = buffer.read_long()?;
            let timeout = buffer.read_long()?;
            builder.session = Some(session);
            builder.timeout = timeout;
        }
        decoded(Self::NAME, builder.build())
    }
}

impl Response for OpenSessionResponse {
    type Builder = OpenSessionResponseBuilder;

    fn builder() -> Self::Builder {
        OpenSessionResponse::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        OpenSessionResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(self.envelope),
            session: Some(self.session),
            timeout: self.timeout,
        }
    }

    fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for OpenSessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OpenSessionResponse[{}, session={}, timeout={}]",
            self.envelope, self.session, self.timeout
        )
    }
}

/// Builder for [`OpenSessionResponse`].
///
/// Status is required. A successful response also requires a positive
/// `session`; the body of a failed response is discarded.
#[derive(Clone, Debug, Default)]
pub struct OpenSessionResponseBuilder {
    envelope: EnvelopeSlot,
    session: Option<i64>,
    timeout: i64,
}

impl OpenSessionResponseBuilder {
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.envelope.set_status(status);
        self
    }

    /// Mark the response failed with the given error kind.
    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.envelope.set_error(kind);
        self
    }

    pub fn with_session(mut self, session: i64) -> Result<Self, BuildError> {
        self.session = Some(positive("session", session)?);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: i64) -> Result<Self, BuildError> {
        self.timeout = non_negative("timeout", timeout)?;
        Ok(self)
    }

    pub fn build(self) -> Result<OpenSessionResponse, BuildError> {
        let envelope = self.envelope.take()?;
        if !envelope.is_ok() {
            return Ok(OpenSessionResponse {
                envelope,
                session: 0,
                timeout: 0,
            });
        }

        let session = self.session.ok_or_else(|| BuildError::missing("session"))?;
        Ok(OpenSessionResponse {
            envelope,
            session: positive("session", session)?,
            timeout: non_negative("timeout", self.timeout)?,
        })
    }
}

impl MessageBuilder for OpenSessionResponseBuilder {
    type Output = OpenSessionResponse;

    fn build(self) -> Result<OpenSessionResponse, BuildError> {
        OpenSessionResponseBuilder::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_roundtrip() {
        let serializer = Serializer::new();
        let response = OpenSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_session(11)
            .and_then(|b| b.with_timeout(5000))
            .and_then(OpenSessionResponseBuilder::build)
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(encoded.len(), 17);

        let decoded = OpenSessionResponse::decode(encoded, &serializer).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.status(), ResponseStatus::Ok);
        assert_eq!(decoded.session(), 11);
        assert_eq!(decoded.timeout(), 5000);
    }

    #[test]
    fn test_error_response_discards_body() {
        let serializer = Serializer::new();
        let response = OpenSessionResponse::builder()
            .with_session(11)
            .unwrap()
            .with_error(ErrorKind::UnknownStateMachine)
            .build()
            .unwrap();

        assert_eq!(response.session(), 0);

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(&encoded[..], &[0x00, 0x08]);

        let decoded = OpenSessionResponse::decode(encoded, &serializer).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.error(), Some(ErrorKind::UnknownStateMachine));
    }

    #[test]
    fn test_build_requires_status() {
        let result = OpenSessionResponse::builder().with_session(1).unwrap().build();
        assert_eq!(result, Err(BuildError::missing("status")));
    }

    #[test]
    fn test_ok_requires_session() {
        let result = OpenSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .build();
        assert_eq!(result, Err(BuildError::missing("session")));
    }

    #[test]
    fn test_display() {
        let response = OpenSessionResponse::builder()
            .with_error(ErrorKind::NoLeader)
            .build()
            .unwrap();
        assert_eq!(
            response.to_string(),
            "OpenSessionResponse[status=error, error=no_leader, session=0, timeout=0]"
        );
    }
}
