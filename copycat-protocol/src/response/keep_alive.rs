//! Keep-alive response.

use copycat_protocol_core::{BufferInput, BufferOutput, ErrorKind, ProtocolResult, Serializer};

use crate::error::BuildError;
use crate::message::{
    EnvelopeSlot, Message, MessageBuilder, Response, ResponseEnvelope, ResponseStatus, decoded,
};

/// Response to a [`KeepAliveRequest`](crate::request::KeepAliveRequest).
///
/// A successful response may name the current leader so the client can
/// redirect future requests.
///
/// ```text
/// ok:    [0x01][leader:string?]
/// error: [0x00][error:byte]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeepAliveResponse {
    envelope: ResponseEnvelope,
    leader: Option<String>,
}

impl KeepAliveResponse {
    pub fn builder() -> KeepAliveResponseBuilder {
        KeepAliveResponseBuilder::default()
    }

    /// Returns the address of the current leader, if known.
    pub fn leader(&self) -> Option<&str> {
        self.leader.as_deref()
    }
}

impl Message for KeepAliveResponse {
    const NAME: &'static str = "keep-alive";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        if self.envelope.is_ok() {
            buffer.write_nullable_string(self.leader.as_deref())?;
        }
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = ResponseEnvelope::read_from(buffer)?;
        let leader = if envelope.is_ok() {
            buffer.read_string()?
        } else {
            None
        };
        let builder = KeepAliveResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(envelope),
            leader,
        };
        decoded(Self::NAME, builder.build())
    }
}

impl Response for KeepAliveResponse {
    type Builder = KeepAliveResponseBuilder;

    fn builder() -> Self::Builder {
        KeepAliveResponse::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        KeepAliveResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(self.envelope),
            leader: self.leader.clone(),
        }
    }

    fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for KeepAliveResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeepAliveResponse[{}, leader={}]",
            self.envelope,
            self.leader.as_deref().unwrap_or("none")
        )
    }
}

/// Builder for [`KeepAliveResponse`].
#[derive(Clone, Debug, Default)]
pub struct KeepAliveResponseBuilder {
    envelope: EnvelopeSlot,
    leader: Option<String>,
}

impl KeepAliveResponseBuilder {
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.envelope.set_status(status);
        self
    }

    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.envelope.set_error(kind);
        self
    }

    pub fn with_leader(mut self, leader: impl Into<String>) -> Self {
        self.leader = Some(leader.into());
        self
    }

    pub fn build(self) -> Result<KeepAliveResponse, BuildError> {
        let envelope = self.envelope.take()?;
        let leader = if envelope.is_ok() { self.leader } else { None };
        Ok(KeepAliveResponse { envelope, leader })
    }
}

impl MessageBuilder for KeepAliveResponseBuilder {
    type Output = KeepAliveResponse;

    fn build(self) -> Result<KeepAliveResponse, BuildError> {
        KeepAliveResponseBuilder::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_roundtrip() {
        let serializer = Serializer::new();
        let response = KeepAliveResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_leader("10.0.0.1:5000")
            .build()
            .unwrap();

        let decoded =
            KeepAliveResponse::decode(response.encode(&serializer).unwrap(), &serializer).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.leader(), Some("10.0.0.1:5000"));
    }

    #[test]
    fn test_unknown_leader_encodes_null() {
        let serializer = Serializer::new();
        let response = KeepAliveResponse::builder()
            .with_status(ResponseStatus::Ok)
            .build()
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(&encoded[..], &[0x01, 0x00]);
        assert_eq!(
            KeepAliveResponse::decode(encoded, &serializer)
                .unwrap()
                .leader(),
            None
        );
    }

    #[test]
    fn test_error_drops_leader() {
        let response = KeepAliveResponse::builder()
            .with_leader("10.0.0.1:5000")
            .with_error(ErrorKind::UnknownSession)
            .build()
            .unwrap();
        assert_eq!(response.leader(), None);
        assert_eq!(
            response.to_string(),
            "KeepAliveResponse[status=error, error=unknown_session, leader=none]"
        );
    }
}
