//! Copycat protocol error kinds and codec error types.
//!
//! This module provides:
//! - [`ErrorKind`]: Error kinds a server reports in a response envelope
//! - [`DecodeError`]: Malformed bytes encountered while reading
//! - [`EncodeError`]: Values that cannot be represented on the wire
//! - [`ProtocolError`]: Top-level error returned by the codec

use std::str::FromStr;
use std::string::FromUtf8Error;

use serde::Serialize;

/// Error kinds reported by the cluster in a response, matching the ids used on
/// the wire.
///
/// Id `0` is reserved for "no error kind given" and has no variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoLeader = 1,
    Query = 2,
    Command = 3,
    Application = 4,
    IllegalMemberState = 5,
    UnknownClient = 6,
    UnknownSession = 7,
    UnknownStateMachine = 8,
    ClosedSession = 9,
    Internal = 10,
    Configuration = 11,
}

impl ErrorKind {
    /// Get the string representation of this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoLeader => "no_leader",
            ErrorKind::Query => "query",
            ErrorKind::Command => "command",
            ErrorKind::Application => "application",
            ErrorKind::IllegalMemberState => "illegal_member_state",
            ErrorKind::UnknownClient => "unknown_client",
            ErrorKind::UnknownSession => "unknown_session",
            ErrorKind::UnknownStateMachine => "unknown_state_machine",
            ErrorKind::ClosedSession => "closed_session",
            ErrorKind::Internal => "internal",
            ErrorKind::Configuration => "configuration",
        }
    }

    /// Get the wire id of this error kind.
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Look up an error kind by wire id.
    ///
    /// Returns `None` for `0` and for ids this version does not know.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(ErrorKind::NoLeader),
            2 => Some(ErrorKind::Query),
            3 => Some(ErrorKind::Command),
            4 => Some(ErrorKind::Application),
            5 => Some(ErrorKind::IllegalMemberState),
            6 => Some(ErrorKind::UnknownClient),
            7 => Some(ErrorKind::UnknownSession),
            8 => Some(ErrorKind::UnknownStateMachine),
            9 => Some(ErrorKind::ClosedSession),
            10 => Some(ErrorKind::Internal),
            11 => Some(ErrorKind::Configuration),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`ErrorKind`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseErrorKindError(());

impl std::fmt::Display for ParseErrorKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown error kind")
    }
}

impl std::error::Error for ParseErrorKindError {}

impl FromStr for ErrorKind {
    type Err = ParseErrorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_leader" => Ok(ErrorKind::NoLeader),
            "query" => Ok(ErrorKind::Query),
            "command" => Ok(ErrorKind::Command),
            "application" => Ok(ErrorKind::Application),
            "illegal_member_state" => Ok(ErrorKind::IllegalMemberState),
            "unknown_client" => Ok(ErrorKind::UnknownClient),
            "unknown_session" => Ok(ErrorKind::UnknownSession),
            "unknown_state_machine" => Ok(ErrorKind::UnknownStateMachine),
            "closed_session" => Ok(ErrorKind::ClosedSession),
            "internal" => Ok(ErrorKind::Internal),
            "configuration" => Ok(ErrorKind::Configuration),
            _ => Err(ParseErrorKindError(())),
        }
    }
}

/// Errors raised while reading a message from a buffer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before the value was complete.
    #[error("buffer underflow reading {context}: need {needed} bytes, {remaining} remaining")]
    Underflow {
        context: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte: 0x{0:02x}")]
    InvalidBoolean(u8),

    /// A length prefix was negative.
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A required string field was encoded as null.
    #[error("required field `{0}` is null")]
    NullField(&'static str),

    /// An enumerated byte did not match any known id.
    #[error("unknown {kind} id: {id}")]
    UnknownId { kind: &'static str, id: u8 },

    /// Bytes were left over after the message was fully read.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// The decoded fields do not form a valid message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Errors raised while writing a message to a buffer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A string is longer than the `u16` length prefix can describe.
    #[error("string of {len} bytes exceeds maximum encodable length {max}")]
    StringTooLong { len: usize, max: usize },

    /// A byte payload is longer than the `i32` length prefix can describe.
    #[error("payload of {len} bytes exceeds maximum encodable length {max}")]
    BytesTooLong { len: usize, max: usize },

    /// The output buffer has no room for the next write.
    #[error("buffer overflow: needed {needed} bytes, {remaining} remaining")]
    Overflow { needed: usize, remaining: usize },
}

/// Top-level codec error.
///
/// Nothing here is fatal: every variant is reported to the immediate caller,
/// which decides whether to drop the frame or the connection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Malformed bytes.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Unrepresentable value.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Frame names a message kind outside the protocol family.
    #[error("unknown message kind: {0:?}")]
    UnknownKind(String),

    /// Frame exceeds the configured size limit.
    #[error("message size {size} bytes exceeds maximum allowed size of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },
}

impl ProtocolError {
    /// Returns true if the error was caused by malformed input bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, ProtocolError::Decode(_) | ProtocolError::UnknownKind(_))
    }
}

/// Convenience alias for codec results.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
