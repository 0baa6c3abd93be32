//! Close session response.

use copycat_protocol_core::{BufferInput, BufferOutput, ErrorKind, ProtocolResult, Serializer};

use crate::error::BuildError;
use crate::message::{
    EnvelopeSlot, Message, MessageBuilder, Response, ResponseEnvelope, ResponseStatus, decoded,
};

/// Response to a [`CloseSessionRequest`](crate::request::CloseSessionRequest).
///
/// Carries only the response envelope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CloseSessionResponse {
    envelope: ResponseEnvelope,
}

impl CloseSessionResponse {
    pub fn builder() -> CloseSessionResponseBuilder {
        CloseSessionResponseBuilder::default()
    }
}

impl Message for CloseSessionResponse {
    const NAME: &'static str = "close-session";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = ResponseEnvelope::read_from(buffer)?;
        let builder = CloseSessionResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(envelope),
        };
        decoded(Self::NAME, builder.build())
    }
}

impl Response for CloseSessionResponse {
    type Builder = CloseSessionResponseBuilder;

    fn builder() -> Self::Builder {
        CloseSessionResponse::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        CloseSessionResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(self.envelope),
        }
    }

    fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for CloseSessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CloseSessionResponse[{}]", self.envelope)
    }
}

/// Builder for [`CloseSessionResponse`].
#[derive(Clone, Debug, Default)]
pub struct CloseSessionResponseBuilder {
    envelope: EnvelopeSlot,
}

impl CloseSessionResponseBuilder {
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.envelope.set_status(status);
        self
    }

    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.envelope.set_error(kind);
        self
    }

    pub fn build(self) -> Result<CloseSessionResponse, BuildError> {
        Ok(CloseSessionResponse {
            envelope: self.envelope.take()?,
        })
    }
}

impl MessageBuilder for CloseSessionResponseBuilder {
    type Output = CloseSessionResponse;

    fn build(self) -> Result<CloseSessionResponse, BuildError> {
        CloseSessionResponseBuilder::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_layout() {
        let serializer = Serializer::new();
        let response = CloseSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .build()
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(&encoded[..], &[0x01]);
        assert_eq!(
            CloseSessionResponse::decode(encoded, &serializer).unwrap(),
            response
        );
    }

    #[test]
    fn test_error_without_kind() {
        let serializer = Serializer::new();
        let response = CloseSessionResponse::builder()
            .with_status(ResponseStatus::Error)
            .build()
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(&encoded[..], &[0x00, 0x00]);

        let decoded = CloseSessionResponse::decode(encoded, &serializer).unwrap();
        assert_eq!(decoded.status(), ResponseStatus::Error);
        assert_eq!(decoded.error(), None);
    }

    #[test]
    fn test_later_status_wins() {
        let response = CloseSessionResponse::builder()
            .with_error(ErrorKind::UnknownSession)
            .with_status(ResponseStatus::Ok)
            .build()
            .unwrap();
        assert!(response.envelope().is_ok());
        assert_eq!(response.error(), None);
    }

    #[test]
    fn test_display() {
        let response = CloseSessionResponse::builder()
            .with_error(ErrorKind::ClosedSession)
            .build()
            .unwrap();
        assert_eq!(
            response.to_string(),
            "CloseSessionResponse[status=error, error=closed_session]"
        );
    }
}
