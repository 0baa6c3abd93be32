//! Command response.

use bytes::Bytes;
use copycat_protocol_core::{BufferInput, BufferOutput, ErrorKind, ProtocolResult, Serializer};

use super::operation::{OperationResult, OperationResultBuilder};
use crate::error::{BuildError, non_negative};
use crate::message::{
    EnvelopeSlot, Message, MessageBuilder, Response, ResponseEnvelope, ResponseStatus, decoded,
};

/// Response to a [`CommandRequest`](crate::request::CommandRequest).
///
/// ```text
/// ok:    [0x01][index:long][event_index:long][result:bytes]
/// error: [0x00][error:byte]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandResponse {
    envelope: ResponseEnvelope,
    result: OperationResult,
}

impl CommandResponse {
    pub fn builder() -> CommandResponseBuilder {
        CommandResponseBuilder::default()
    }

    pub fn index(&self) -> i64 {
        self.result.index()
    }

    pub fn event_index(&self) -> i64 {
        self.result.event_index()
    }

    pub fn result(&self) -> &Bytes {
        self.result.result()
    }

    /// Returns the full operation outcome.
    pub fn operation_result(&self) -> &OperationResult {
        &self.result
    }
}

impl Message for CommandResponse {
    const NAME: &'static str = "command";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        if self.envelope.is_ok() {
            self.result.write_to(buffer)?;
        }
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = ResponseEnvelope::read_from(buffer)?;
        let result = if envelope.is_ok() {
            OperationResult::read_from(buffer)?
        } else {
            OperationResultBuilder::default()
        };
        let builder = CommandResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(envelope),
            result,
        };
        decoded(Self::NAME, builder.build())
    }
}

impl Response for CommandResponse {
    type Builder = CommandResponseBuilder;

    fn builder() -> Self::Builder {
        CommandResponse::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        CommandResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(self.envelope),
            result: OperationResultBuilder::from_result(&self.result),
        }
    }

    fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CommandResponse[{}, {}]", self.envelope, self.result)
    }
}

/// Builder for [`CommandResponse`].
///
/// Status is required; result fields default to zero and are discarded for
/// failed responses.
#[derive(Clone, Debug, Default)]
pub struct CommandResponseBuilder {
    envelope: EnvelopeSlot,
    result: OperationResultBuilder,
}

impl CommandResponseBuilder {
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.envelope.set_status(status);
        self
    }

    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.envelope.set_error(kind);
        self
    }

    pub fn with_index(mut self, index: i64) -> Result<Self, BuildError> {
        self.result.index = non_negative("index", index)?;
        Ok(self)
    }

    pub fn with_event_index(mut self, index: i64) -> Result<Self, BuildError> {
        self.result.event_index = non_negative("event_index", index)?;
        Ok(self)
    }

    pub fn with_result<T: Into<Bytes>>(mut self, result: T) -> Self {
        self.result.result = result.into();
        self
    }

    pub fn build(self) -> Result<CommandResponse, BuildError> {
        let envelope = self.envelope.take()?;
        let result = if envelope.is_ok() {
            self.result.build()?
        } else {
            OperationResult::default()
        };
        Ok(CommandResponse { envelope, result })
    }
}

impl MessageBuilder for CommandResponseBuilder {
    type Output = CommandResponse;

    fn build(self) -> Result<CommandResponse, BuildError> {
        CommandResponseBuilder::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_response_roundtrip() {
        let serializer = Serializer::new();
        let response = CommandResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_index(42)
            .and_then(|b| b.with_event_index(40))
            .unwrap()
            .with_result(&b"locked"[..])
            .build()
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(encoded.len(), 1 + 8 + 8 + 4 + 6);

        let decoded = CommandResponse::decode(encoded, &serializer).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.index(), 42);
        assert_eq!(decoded.event_index(), 40);
        assert_eq!(decoded.result(), &Bytes::from_static(b"locked"));
    }

    #[test]
    fn test_command_error_has_no_body() {
        let serializer = Serializer::new();
        let response = CommandResponse::builder()
            .with_index(42)
            .unwrap()
            .with_error(ErrorKind::Command)
            .build()
            .unwrap();

        let encoded = response.encode(&serializer).unwrap();
        assert_eq!(&encoded[..], &[0x00, 0x03]);

        let decoded = CommandResponse::decode(encoded, &serializer).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.index(), 0);
    }

    #[test]
    fn test_truncated_body() {
        let serializer = Serializer::new();
        let err = CommandResponse::decode(&[0x01, 0x00, 0x00][..], &serializer).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_negative_event_index_rejected() {
        let result = CommandResponse::builder().with_event_index(-5);
        assert!(matches!(
            result,
            Err(BuildError::InvalidArgument {
                field: "event_index",
                ..
            })
        ));
    }
}
