//! Body shared by command and query responses.

use bytes::Bytes;
use copycat_protocol_core::{BufferInput, BufferOutput, ProtocolResult};

use crate::error::{BuildError, non_negative};

/// Outcome of an operation applied to a state machine.
///
/// ```text
/// [index:long][event_index:long][result:bytes]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OperationResult {
    index: i64,
    event_index: i64,
    result: Bytes,
}

impl OperationResult {
    /// Returns the log index at which the operation was applied.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Returns the index of the last event published to the session.
    pub fn event_index(&self) -> i64 {
        self.event_index
    }

    /// Returns the encoded operation output.
    pub fn result(&self) -> &Bytes {
        &self.result
    }

    pub(crate) fn write_to<B: BufferOutput + ?Sized>(&self, buffer: &mut B) -> ProtocolResult<()> {
        buffer.write_long(self.index)?;
        buffer.write_long(self.event_index)?;
        buffer.write_bytes(&self.result)?;
        Ok(())
    }

    pub(crate) fn read_from<B: BufferInput + ?Sized>(
        buffer: &mut B,
    ) -> ProtocolResult<OperationResultBuilder> {
        let index = buffer.read_long()?;
        let event_index = buffer.read_long()?;
        let result = buffer.read_bytes()?;
        Ok(OperationResultBuilder {
            index,
            event_index,
            result,
        })
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index={}, event_index={}, result={} bytes",
            self.index,
            self.event_index,
            self.result.len()
        )
    }
}

/// Unvalidated result fields held by the response builders.
#[derive(Clone, Debug, Default)]
pub(crate) struct OperationResultBuilder {
    pub(crate) index: i64,
    pub(crate) event_index: i64,
    pub(crate) result: Bytes,
}

impl OperationResultBuilder {
    pub(crate) fn from_result(result: &OperationResult) -> Self {
        Self {
            index: result.index,
            event_index: result.event_index,
            result: result.result.clone(),
        }
    }

    pub(crate) fn build(self) -> Result<OperationResult, BuildError> {
        Ok(OperationResult {
            index: non_negative("index", self.index)?,
            event_index: non_negative("event_index", self.event_index)?,
            result: self.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_operation_result_layout() {
        let result = OperationResultBuilder {
            index: 7,
            event_index: 3,
            result: Bytes::from_static(b"ok"),
        }
        .build()
        .unwrap();

        let mut buf = BytesMut::new();
        result.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 8 + 8 + 4 + 2);
        assert_eq!(&buf[..8], &7i64.to_be_bytes());
        assert_eq!(&buf[20..], b"ok");

        let mut input = buf.freeze();
        let decoded = OperationResult::read_from(&mut input)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_negative_index_rejected() {
        let err = OperationResultBuilder {
            index: -1,
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.field(), "index");
    }
}
