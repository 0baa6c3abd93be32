//! Kind-tagged dispatch over the whole message family.
//!
//! A transport reads a [`Frame`], then hands it to [`AnyRequest::from_frame`]
//! or [`AnyResponse::from_frame`] depending on which side of the connection
//! it sits on. Requests and responses share kind names; the direction is
//! implied by the channel.

use bytes::{Buf, Bytes};
use copycat_protocol_core::{Frame, ProtocolError, ProtocolResult, Serializer, read_frame};

use crate::message::Message;
use crate::request::{
    CloseSessionRequest, CommandRequest, KeepAliveRequest, OpenSessionRequest, QueryRequest,
};
use crate::response::{
    CloseSessionResponse, CommandResponse, KeepAliveResponse, OpenSessionResponse, QueryResponse,
};

macro_rules! impl_message_union {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($message:ty)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant($message),)+
        }

        impl $name {
            /// Every kind name this union can decode.
            pub const KINDS: &'static [&'static str] = &[$(<$message as Message>::NAME,)+];

            /// Returns the kind name written in this message's frame.
            pub fn kind(&self) -> &'static str {
                match self {
                    $($name::$variant(_) => <$message as Message>::NAME,)+
                }
            }

            /// Encode the message payload without a frame.
            pub fn encode(&self, serializer: &Serializer) -> ProtocolResult<Bytes> {
                match self {
                    $($name::$variant(message) => message.encode(serializer),)+
                }
            }

            /// Encode the message wrapped in a frame tagged with its kind.
            pub fn to_frame(&self, serializer: &Serializer) -> ProtocolResult<Bytes> {
                match self {
                    $($name::$variant(message) => message.to_frame(serializer),)+
                }
            }

            /// Decode a frame's payload according to its kind.
            ///
            /// # Errors
            /// Returns [`ProtocolError::UnknownKind`] if the kind is not part of
            /// this union, or the payload's decode error otherwise.
            pub fn from_frame(frame: &Frame, serializer: &Serializer) -> ProtocolResult<Self> {
                $(
                    if frame.kind() == <$message as Message>::NAME {
                        return <$message as Message>::decode(frame.payload().clone(), serializer)
                            .map($name::$variant);
                    }
                )+
                tracing::debug!(
                    target: "copycat_protocol",
                    kind = %frame.kind(),
                    union = stringify!($name),
                    "unknown message kind"
                );
                Err(ProtocolError::UnknownKind(frame.kind().to_owned()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($name::$variant(message) => std::fmt::Display::fmt(message, f),)+
                }
            }
        }

        $(
            impl From<$message> for $name {
                fn from(message: $message) -> Self {
                    $name::$variant(message)
                }
            }
        )+
    };
}

impl_message_union! {
    /// Any request a client may send.
    AnyRequest {
        OpenSession(OpenSessionRequest),
        CloseSession(CloseSessionRequest),
        KeepAlive(KeepAliveRequest),
        Command(CommandRequest),
        Query(QueryRequest),
    }
}

impl_message_union! {
    /// Any response the cluster may send.
    AnyResponse {
        OpenSession(OpenSessionResponse),
        CloseSession(CloseSessionResponse),
        KeepAlive(KeepAliveResponse),
        Command(CommandResponse),
        Query(QueryResponse),
    }
}

/// Read one framed request from `buf`.
///
/// Bytes after the frame are left in `buf` for the next call.
pub fn read_request<B: Buf>(buf: &mut B, serializer: &Serializer) -> ProtocolResult<AnyRequest> {
    let frame = read_frame(buf, serializer)?;
    AnyRequest::from_frame(&frame, serializer)
}

/// Read one framed response from `buf`.
pub fn read_response<B: Buf>(buf: &mut B, serializer: &Serializer) -> ProtocolResult<AnyResponse> {
    let frame = read_frame(buf, serializer)?;
    AnyResponse::from_frame(&frame, serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ResponseStatus;
    use bytes::BytesMut;
    use copycat_protocol_core::{DecodeError, ErrorKind, MessageLimits, wrap_frame};

    fn open_session() -> OpenSessionRequest {
        OpenSessionRequest::builder()
            .with_client("client-1")
            .with_name("lock")
            .with_type("atomic-lock")
            .with_timeout(5000)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_frame_dispatch() {
        let serializer = Serializer::new();
        let request = AnyRequest::from(open_session());
        assert_eq!(request.kind(), "open-session");

        let mut framed = request.to_frame(&serializer).unwrap();
        let decoded = read_request(&mut framed, &serializer).unwrap();
        assert_eq!(decoded, request);
        assert!(!framed.has_remaining());
    }

    #[test]
    fn test_consecutive_frames() {
        let serializer = Serializer::new();
        let first = AnyRequest::from(open_session());
        let second = AnyRequest::from(
            KeepAliveRequest::builder()
                .with_session(4)
                .unwrap()
                .build()
                .unwrap(),
        );

        let mut stream = BytesMut::new();
        stream.extend_from_slice(&first.to_frame(&serializer).unwrap());
        stream.extend_from_slice(&second.to_frame(&serializer).unwrap());
        let mut stream = stream.freeze();

        assert_eq!(read_request(&mut stream, &serializer).unwrap(), first);
        assert_eq!(read_request(&mut stream, &serializer).unwrap(), second);
        assert!(!stream.has_remaining());
    }

    #[test]
    fn test_response_frame_dispatch() {
        let serializer = Serializer::new();
        let response = AnyResponse::from(
            CloseSessionResponse::builder()
                .with_status(ResponseStatus::Ok)
                .build()
                .unwrap(),
        );

        let mut framed = response.to_frame(&serializer).unwrap();
        assert_eq!(
            read_response(&mut framed, &serializer).unwrap(),
            response
        );
    }

    #[test]
    fn test_same_kind_differs_by_direction() {
        let serializer = Serializer::new();
        let response = OpenSessionResponse::builder()
            .with_error(ErrorKind::NoLeader)
            .build()
            .unwrap();
        let frame = Frame::new("open-session", response.encode(&serializer).unwrap());

        assert!(AnyResponse::from_frame(&frame, &serializer).is_ok());
        assert!(AnyRequest::from_frame(&frame, &serializer).is_err());
    }

    #[test]
    fn test_unknown_kind() {
        let serializer = Serializer::new();
        let mut framed = wrap_frame("publish", Bytes::new(), &serializer).unwrap();

        let err = read_request(&mut framed, &serializer).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownKind("publish".to_owned()));
        assert!(err.is_decode());
    }

    #[test]
    fn test_trailing_payload_bytes_rejected() {
        let serializer = Serializer::new();
        let mut payload = BytesMut::new();
        payload.extend_from_slice(&open_session().encode(&serializer).unwrap());
        payload.extend_from_slice(&[0xff]);
        let frame = Frame::new("open-session", payload.freeze());

        let err = AnyRequest::from_frame(&frame, &serializer).unwrap_err();
        assert_eq!(err, ProtocolError::Decode(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_receive_limit_applies() {
        let sender = Serializer::new();
        let receiver = Serializer::new().with_limits(MessageLimits::new().receive_max_bytes(16));

        let mut framed = AnyRequest::from(open_session()).to_frame(&sender).unwrap();
        let err = read_request(&mut framed, &receiver).unwrap_err();
        assert!(matches!(err, ProtocolError::MessageTooLarge { max: 16, .. }));
    }

    #[test]
    fn test_kinds_listed() {
        assert_eq!(
            AnyRequest::KINDS,
            &["open-session", "close-session", "keep-alive", "command", "query"]
        );
        assert_eq!(AnyResponse::KINDS, AnyRequest::KINDS);
    }

    #[test]
    fn test_display_delegates() {
        let request = AnyRequest::from(open_session());
        assert_eq!(request.to_string(), open_session().to_string());
    }
}
