//! Query response.

use bytes::Bytes;
use copycat_protocol_core::{BufferInput, BufferOutput, ErrorKind, ProtocolResult, Serializer};

use super::operation::{OperationResult, OperationResultBuilder};
use crate::error::{BuildError, non_negative};
use crate::message::{
    EnvelopeSlot, Message, MessageBuilder, Response, ResponseEnvelope, ResponseStatus, decoded,
};

/// Response to a [`QueryRequest`](crate::request::QueryRequest).
///
/// ```text
/// ok:    [0x01][index:long][event_index:long][result:bytes]
/// error: [0x00][error:byte]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryResponse {
    envelope: ResponseEnvelope,
    result: OperationResult,
}

impl QueryResponse {
    pub fn builder() -> QueryResponseBuilder {
        QueryResponseBuilder::default()
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

impl Message for QueryResponse {
    const NAME: &'static str = "query";

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
        let builder = QueryResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(envelope),
            result,
        };
        decoded(Self::NAME, builder.build())
    }
}

impl Response for QueryResponse {
    type Builder = QueryResponseBuilder;

    fn builder() -> Self::Builder {
        QueryResponse::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        QueryResponseBuilder {
            envelope: EnvelopeSlot::from_envelope(self.envelope),
            result: OperationResultBuilder::from_result(&self.result),
        }
    }

    fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "QueryResponse[{}, {}]", self.envelope, self.result)
    }
}

/// Builder for [`QueryResponse`].
///
/// Status is required; result fields default to zero and are discarded for
/// failed responses.
#[derive(Clone, Debug, Default)]
pub struct QueryResponseBuilder {
    envelope: EnvelopeSlot,
    result: OperationResultBuilder,
}

impl QueryResponseBuilder {
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

    pub fn build(self) -> Result<QueryResponse, BuildError> {
        let envelope = self.envelope.take()?;
        let result = if envelope.is_ok() {
            self.result.build()?
        } else {
            OperationResult::default()
        };
        Ok(QueryResponse { envelope, result })
    }
}

impl MessageBuilder for QueryResponseBuilder {
    type Output = QueryResponse;

    fn build(self) -> Result<QueryResponse, BuildError> {
        QueryResponseBuilder::build(self)
    }
}
