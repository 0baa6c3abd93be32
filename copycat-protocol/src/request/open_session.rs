//! Open session request.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use copycat_protocol_core::{BufferInput, BufferOutput, ProtocolResult, Serializer};

use crate::error::{BuildError, non_negative};
use crate::message::{Message, MessageBuilder, Request, RequestEnvelope, decoded};

/// Request to open a session binding a client to a named state machine.
///
/// Equality and hashing cover `name`, `type` and `timeout` only. Two requests
/// that differ only in `client` are equal, so a retried open from a
/// reconnecting client deduplicates against the first attempt.
///
/// # Wire Format
///
/// ```text
/// [envelope][client:string][name:string][type:string][timeout:long]
/// ```
///
/// # Example
///
/// ```
/// use copycat_protocol::prelude::*;
///
/// let request = OpenSessionRequest::builder()
///     .with_client("c1")
///     .with_name("lock-a")
///     .with_type("lock")
///     .with_timeout(5000)?
///     .build()?;
///
/// assert_eq!(request.to_string(), "OpenSessionRequest[name=lock-a, type=lock, timeout=5000]");
/// # Ok::<(), BuildError>(())
/// ```
#[derive(Clone)]
pub struct OpenSessionRequest {
    envelope: RequestEnvelope,
    client: String,
    name: String,
    type_name: String,
    timeout: i64,
}

impl OpenSessionRequest {
    /// Returns a new open session request builder.
    pub fn builder() -> OpenSessionRequestBuilder {
        OpenSessionRequestBuilder::default()
    }

    /// Returns the client identifier.
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Returns the state machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the state machine type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the requested session timeout in milliseconds.
    pub fn timeout(&self) -> i64 {
        self.timeout
    }

    /// Returns the requested session timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout.unsigned_abs())
    }
}

impl Message for OpenSessionRequest {
    const NAME: &'static str = "open-session";

    fn write_fields<B: BufferOutput + ?Sized>(
        &self,
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<()> {
        self.envelope.write_to(buffer)?;
        buffer.write_string(&self.client)?;
        buffer.write_string(&self.name)?;
        buffer.write_string(&self.type_name)?;
        buffer.write_long(self.timeout)?;
        Ok(())
    }

    fn read_object<B: BufferInput + ?Sized>(
        buffer: &mut B,
        _serializer: &Serializer,
    ) -> ProtocolResult<Self> {
        let envelope = RequestEnvelope::read_from(buffer)?;
        let client = buffer.read_required_string("client")?;
        let name = buffer.read_required_string("name")?;
        let type_name = buffer.read_required_string("type")?;
        let timeout = buffer.read_long()?;

        let request = OpenSessionRequest::builder()
            .with_client(client)
            .with_name(name)
            .with_type(type_name)
            .with_timeout(timeout)
            .and_then(OpenSessionRequestBuilder::build)
            .map(|request| OpenSessionRequest { envelope, ..request });
        decoded(Self::NAME, request)
    }
}

impl Request for OpenSessionRequest {
    type Builder = OpenSessionRequestBuilder;

    fn builder() -> Self::Builder {
        OpenSessionRequest::builder()
    }

    fn to_builder(&self) -> Self::Builder {
        OpenSessionRequestBuilder {
            client: Some(self.client.clone()),
            name: Some(self.name.clone()),
            type_name: Some(self.type_name.clone()),
            timeout: self.timeout,
        }
    }

    fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }
}

impl PartialEq for OpenSessionRequest {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name && self.timeout == other.timeout
    }
}

impl Eq for OpenSessionRequest {}

impl Hash for OpenSessionRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_name.hash(state);
        self.timeout.hash(state);
    }
}

// Debug and Display render exactly the fields that take part in equality.
impl std::fmt::Debug for OpenSessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSessionRequest")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl std::fmt::Display for OpenSessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OpenSessionRequest[name={}, type={}, timeout={}]",
            self.name, self.type_name, self.timeout
        )
    }
}

/// Builder for [`OpenSessionRequest`].
///
/// `client`, `name` and `type` are required. `timeout` defaults to `0`.
#[derive(Clone, Debug, Default)]
pub struct OpenSessionRequestBuilder {
    client: Option<String>,
    name: Option<String>,
    type_name: Option<String>,
    timeout: i64,
}

impl OpenSessionRequestBuilder {
    /// Set the client identifier.
    pub fn with_client<S: Into<String>>(mut self, client: S) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Set the state machine name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the state machine type.
    pub fn with_type<S: Into<String>>(mut self, type_name: S) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the session timeout in milliseconds.
    ///
    /// # Errors
    /// Returns [`BuildError::InvalidArgument`] if `timeout` is negative. Zero is
    /// accepted.
    pub fn with_timeout(mut self, timeout: i64) -> Result<Self, BuildError> {
        self.timeout = non_negative("timeout", timeout)?;
        Ok(self)
    }

    /// Build the request.
    ///
    /// # Errors
    /// Returns [`BuildError::InvalidState`] if `client`, `name` or `type` was
    /// never set.
    pub fn build(self) -> Result<OpenSessionRequest, BuildError> {
        let client = self.client.ok_or_else(|| BuildError::missing("client"))?;
        let name = self.name.ok_or_else(|| BuildError::missing("name"))?;
        let type_name = self.type_name.ok_or_else(|| BuildError::missing("type"))?;
        Ok(OpenSessionRequest {
            envelope: RequestEnvelope,
            client,
            name,
            type_name,
            timeout: non_negative("timeout", self.timeout)?,
        })
    }
}

impl MessageBuilder for OpenSessionRequestBuilder {
    type Output = OpenSessionRequest;

    fn build(self) -> Result<OpenSessionRequest, BuildError> {
        OpenSessionRequestBuilder::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use copycat_protocol_core::{DecodeError, EncodeError, ProtocolError};
    use std::collections::hash_map::DefaultHasher;

    fn request(client: &str, name: &str, type_name: &str, timeout: i64) -> OpenSessionRequest {
        OpenSessionRequest::builder()
            .with_client(client)
            .with_name(name)
            .with_type(type_name)
            .with_timeout(timeout)
            .unwrap()
            .build()
            .unwrap()
    }

    fn hash_of(request: &OpenSessionRequest) -> u64 {
        let mut hasher = DefaultHasher::new();
        request.hash(&mut hasher);
        hasher.finish()
    }

    fn roundtrip(request: &OpenSessionRequest) -> OpenSessionRequest {
        let serializer = Serializer::new();
        let encoded = request.encode(&serializer).unwrap();
        OpenSessionRequest::decode(encoded, &serializer).unwrap()
    }

    #[test]
    fn test_open_session_scenario() {
        let original = request("c1", "lock-a", "lock", 5000);
        let decoded = roundtrip(&original);

        assert_eq!(decoded.name(), "lock-a");
        assert_eq!(decoded.type_name(), "lock");
        assert_eq!(decoded.timeout(), 5000);
        assert_eq!(decoded.client(), "c1");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_wire_layout() {
        let encoded = request("c1", "a", "t", 5000)
            .encode(&Serializer::new())
            .unwrap();

        assert_eq!(
            &encoded[..],
            &[
                0x01, 0x00, 0x02, b'c', b'1', // client
                0x01, 0x00, 0x01, b'a', // name
                0x01, 0x00, 0x01, b't', // type
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x13, 0x88, // timeout
            ]
        );
    }

    #[test]
    fn test_client_survives_roundtrip() {
        let original = request("client-\u{1F512}", "lock-a", "lock", 1);
        let decoded = roundtrip(&original);

        assert_eq!(decoded.client().as_bytes(), original.client().as_bytes());
    }

    #[test]
    fn test_build_requires_client() {
        let result = OpenSessionRequest::builder()
            .with_name("lock-a")
            .with_type("lock")
            .build();
        assert_eq!(result.unwrap_err(), BuildError::missing("client"));
    }

    #[test]
    fn test_build_requires_name() {
        let result = OpenSessionRequest::builder()
            .with_client("c1")
            .with_type("lock")
            .build();
        assert_eq!(result.unwrap_err(), BuildError::missing("name"));
    }

    #[test]
    fn test_build_requires_type() {
        let result = OpenSessionRequest::builder()
            .with_client("c1")
            .with_name("lock-a")
            .build();
        assert_eq!(result.unwrap_err(), BuildError::missing("type"));
    }

    #[test]
    fn test_build_with_all_required_fields() {
        let request = OpenSessionRequest::builder()
            .with_client("c1")
            .with_name("lock-a")
            .with_type("lock")
            .build()
            .unwrap();
        assert_eq!(request.timeout(), 0);
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let result = OpenSessionRequest::builder().with_timeout(-1);
        assert!(matches!(
            result,
            Err(BuildError::InvalidArgument {
                field: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_timeout_accepted() {
        // Only negative timeouts are rejected.
        let request = request("c1", "lock-a", "lock", 0);
        assert_eq!(roundtrip(&request).timeout(), 0);
        assert_eq!(request.timeout_duration(), Duration::ZERO);
    }

    #[test]
    fn test_max_timeout_roundtrip() {
        let request = request("c1", "lock-a", "lock", i64::MAX);
        let decoded = roundtrip(&request);
        assert_eq!(decoded.timeout(), i64::MAX);
    }

    #[test]
    fn test_failed_setter_keeps_other_fields() {
        let builder = OpenSessionRequest::builder()
            .with_client("c1")
            .with_name("lock-a")
            .with_type("lock")
            .with_timeout(100)
            .unwrap();

        assert!(builder.clone().with_timeout(-5).is_err());

        let request = builder.build().unwrap();
        assert_eq!(request.client(), "c1");
        assert_eq!(request.name(), "lock-a");
        assert_eq!(request.type_name(), "lock");
        assert_eq!(request.timeout(), 100);
    }

    #[test]
    fn test_equality_ignores_client() {
        let a = request("c1", "lock-a", "lock", 5000);
        let b = request("c2", "lock-a", "lock", 5000);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_equality_covers_identity_fields() {
        let base = request("c1", "lock-a", "lock", 5000);

        assert_ne!(base, request("c1", "lock-b", "lock", 5000));
        assert_ne!(base, request("c1", "lock-a", "map", 5000));
        assert_ne!(base, request("c1", "lock-a", "lock", 5001));
    }

    #[test]
    fn test_display_matches_equality_fields() {
        let request = request("c1", "lock-a", "lock", 5000);

        assert_eq!(
            request.to_string(),
            "OpenSessionRequest[name=lock-a, type=lock, timeout=5000]"
        );
        assert!(!request.to_string().contains("c1"));
        assert!(!format!("{request:?}").contains("c1"));
    }

    #[test]
    fn test_to_builder_copy_and_modify() {
        let original = request("c1", "lock-a", "lock", 5000);
        let modified = original
            .to_builder()
            .with_name("lock-b")
            .build()
            .unwrap();

        assert_eq!(modified.client(), "c1");
        assert_eq!(modified.name(), "lock-b");
        assert_eq!(modified.timeout(), 5000);
        assert_eq!(original.name(), "lock-a");
    }

    #[test]
    fn test_decode_null_required_field() {
        let mut buffer = BytesMut::new();
        buffer.write_string("c1").unwrap();
        buffer.write_nullable_string(None).unwrap();
        buffer.write_string("lock").unwrap();
        buffer.write_long(10).unwrap();

        let err = OpenSessionRequest::decode(buffer.freeze(), &Serializer::new()).unwrap_err();
        assert_eq!(err, ProtocolError::Decode(DecodeError::NullField("name")));
    }

    #[test]
    fn test_decode_negative_timeout() {
        let mut buffer = BytesMut::new();
        buffer.write_string("c1").unwrap();
        buffer.write_string("lock-a").unwrap();
        buffer.write_string("lock").unwrap();
        buffer.write_long(-1).unwrap();

        let err = OpenSessionRequest::decode(buffer.freeze(), &Serializer::new()).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Decode(DecodeError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let encoded = request("c1", "lock-a", "lock", 5000)
            .encode(&Serializer::new())
            .unwrap();
        let truncated = encoded.slice(..encoded.len() - 1);

        let err = OpenSessionRequest::decode(truncated, &Serializer::new()).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut buffer = BytesMut::from(
            &request("c1", "lock-a", "lock", 5000)
                .encode(&Serializer::new())
                .unwrap()[..],
        );
        buffer.extend_from_slice(&[0xAB]);

        let err = OpenSessionRequest::decode(buffer.freeze(), &Serializer::new()).unwrap_err();
        assert_eq!(err, ProtocolError::Decode(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_encode_rejects_oversized_name() {
        let request = request("c1", &"n".repeat(70_000), "lock", 1);
        let err = request.encode(&Serializer::new()).unwrap_err();
        assert!(!err.is_decode());
    }

    #[test]
    fn test_write_into_small_fixed_buffer() {
        let request = request("c1", "lock-a", "lock", 5000);
        let mut storage = [0u8; 8];
        let mut buffer = &mut storage[..];

        let err = request
            .write_object(&mut buffer, &Serializer::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Encode(EncodeError::Overflow {
                remaining: 8,
                ..
            })
        ));
        assert_eq!(buffer.len(), 8);
        assert_eq!(storage, [0u8; 8]);
    }

    #[test]
    fn test_failed_write_leaves_buffer_unchanged() {
        let serializer = Serializer::new();
        let mut buffer = BytesMut::from(&b"head"[..]);

        let oversized = request("c1", &"n".repeat(70_000), "lock", 1);
        let err = oversized.write_object(&mut buffer, &serializer).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Encode(EncodeError::StringTooLong { len: 70_000, .. })
        ));
        assert_eq!(&buffer[..], b"head");

        let valid = request("c1", "lock-a", "lock", 5000);
        valid.write_object(&mut buffer, &serializer).unwrap();
        let mut payload = buffer.freeze().slice(4..);
        assert_eq!(
            OpenSessionRequest::read_object(&mut payload, &serializer).unwrap(),
            valid
        );
    }
}
