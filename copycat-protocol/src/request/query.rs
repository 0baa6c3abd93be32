//! Query request.

use bytes::Bytes;
use copycat_protocol_core::{
    BufferInput, BufferOutput, DecodeError, ProtocolResult, Serializer,
};
use serde::Serialize;

use crate::error::{BuildError, non_negative, positive};
use crate::message::{Message, MessageBuilder, Request, RequestEnvelope, decoded};

/// Consistency guarantee requested for a query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Reads may be served by any member, in session order.
    Sequential = 0,
    /// Linearizable reads relying on the leader's lease.
    LinearizableLease = 1,
    /// Linearizable reads confirmed with a quorum.
    #[default]
    Linearizable = 2,
}

impl ConsistencyLevel {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ConsistencyLevel::Sequential),
            1 => Some(ConsistencyLevel::LinearizableLease),
            2 => Some(ConsistencyLevel::Linearizable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Sequential => "sequential",
            ConsistencyLevel::LinearizableLease => "linearizable_lease",
            ConsistencyLevel::Linearizable => "linearizable",
        }
    }
}

impl std::fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to evaluate a read-only operation through a session.
///
/// ```text
/// [envelope][session:long][sequence:long][index:long][consistency:byte][operation:bytes]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryRequest {
    envelope: RequestEnvelope,
    session: i64,
    sequence: i64,
    index: i64,
    consistency: ConsistencyLevel,
    operation: Bytes,
}

impl QueryRequest {
    pub fn builder() -> QueryRequestBuilder {
        QueryRequestBuilder::default()
    }

    pub fn session(&self) -> i64 {
        self.session
    }

    /// Returns the sequence number of the last command the query must observe.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Returns the minimum log index the query must observe.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    pub fn operation(&self) -> &Bytes {
        &self.operation
    }
}

impl Message for QueryRequest {
    const NAME: &'static str = "query";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        buffer.write_long(self.session)?;
        buffer.write_long(self.sequence)?;
        buffer.write_long(self.index)?;
        buffer.write_byte(self.consistency.id())?;
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
        let index = buffer.read_long()?;
        let id = buffer.read_byte()?;
        let consistency = ConsistencyLevel::from_id(id).ok_or(DecodeError::UnknownId {
            kind: "consistency level",
            id,
        })?;
        let operation = buffer.read_bytes()?;

        let request = QueryRequest::builder()
            .with_session(session)
            .and_then(|b| b.with_sequence(sequence))
            .and_then(|b| b.with_index(index))
            .map(|b| b.with_consistency(consistency).with_operation(operation))
            .and_then(QueryRequestBuilder::build)
            .map(|request| QueryRequest { envelope, ..request });
        decoded(Self::NAME, request)
    }
}

impl Request for QueryRequest {
    type Builder = QueryRequestBuilder;

    fn builder() -> Self::Builder {
        QueryRequest::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        QueryRequestBuilder {
            session: Some(self.session),
            sequence: self.sequence,
            index: self.index,
            consistency: self.consistency,
            operation: Some(self.operation.clone()),
        }
    }

    fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

impl std::fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QueryRequest[session={}, sequence={}, index={}, consistency={}, operation={} bytes]",
            self.session,
            self.sequence,
            self.index,
            self.consistency,
            self.operation.len()
        )
    }
}

/// Builder for [`QueryRequest`].
///
/// `session` and `operation` are required. Consistency defaults to
/// [`ConsistencyLevel::Linearizable`].
#[derive(Clone, Debug, Default)]
pub struct QueryRequestBuilder {
    session: Option<i64>,
    sequence: i64,
    index: i64,
    consistency: ConsistencyLevel,
    operation: Option<Bytes>,
}

impl QueryRequestBuilder {
    pub fn with_session(mut self, session: i64) -> Result<Self, BuildError> {
        self.session = Some(positive("session", session)?);
        Ok(self)
    }

    pub fn with_sequence(mut self, sequence: i64) -> Result<Self, BuildError> {
        self.sequence = non_negative("sequence", sequence)?;
        Ok(self)
    }

    pub fn with_index(mut self, index: i64) -> Result<Self, BuildError> {
        self.index = non_negative("index", index)?;
        Ok(self)
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_operation<T: Into<Bytes>>(mut self, operation: T) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn build(self) -> Result<QueryRequest, BuildError> {
        let session = self.session.ok_or_else(|| BuildError::missing("session"))?;
        let operation = self
            .operation
            .ok_or_else(|| BuildError::missing("operation"))?;
        Ok(QueryRequest {
            envelope: RequestEnvelope,
            session,
            sequence: self.sequence,
            index: self.index,
            consistency: self.consistency,
            operation,
        })
    }
}

impl MessageBuilder for QueryRequestBuilder {
    type Output = QueryRequest;

    fn build(self) -> Result<QueryRequest, BuildError> {
        QueryRequestBuilder::build(self)
    }
}
