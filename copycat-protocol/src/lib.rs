//! # Copycat Protocol
//!
//! Request and response messages a client exchanges with a copycat cluster
//! to open, keep alive, use and close a session.
//!
//! ## Features
//!
//! - **Validated builders:** every message is built through a builder whose
//!   setters reject out-of-range values immediately and whose `build()`
//!   rejects incomplete messages.
//! - **Immutable messages:** built messages expose accessors only; use
//!   `to_builder()` to derive a modified copy.
//! - **Binary encoding:** a compact big-endian wire format shared by every
//!   message, with kind-tagged frames for dispatch.
//! - **Size limits:** [`MessageLimits`](copycat_protocol_core::MessageLimits)
//!   bounds the frames a peer will send or accept.
//!
//! ## Getting Started
//!
//! ```
//! use copycat_protocol::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let serializer = Serializer::new();
//! let request = KeepAliveRequest::builder()
//!     .with_session(7)?
//!     .with_command_sequence(3)?
//!     .build()?;
//!
//! let mut framed = request.to_frame(&serializer)?;
//! let decoded = read_request(&mut framed, &serializer)?;
//! assert_eq!(decoded, AnyRequest::KeepAlive(request));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod message;
pub mod request;
pub mod response;

// Re-export the wire layer
pub use copycat_protocol_core;

pub mod prelude {
    //! A prelude for `copycat-protocol` providing the most common types.
    pub use crate::codec::{AnyRequest, AnyResponse, read_request, read_response};
    pub use crate::error::BuildError;
    pub use crate::message::{
        Message, MessageBuilder, Request, RequestEnvelope, Response, ResponseEnvelope,
        ResponseStatus,
    };
    pub use crate::request::*;
    pub use crate::response::*;
    pub use copycat_protocol_core::{
        ErrorKind, Frame, MessageLimits, ProtocolError, ProtocolResult, Serializer,
    };
}
