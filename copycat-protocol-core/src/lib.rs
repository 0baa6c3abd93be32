//! Core wire types for the copycat protocol.
//!
//! This crate provides the shared building blocks used by every message of
//! the protocol family (`copycat-protocol`) on both the client and the server.
//!
//! ## Modules
//!
//! - [`error`]: Error kinds carried in responses and codec error types
//! - [`buffer`]: Primitive read/write operations over `bytes` buffers
//! - [`limits`]: Message size limits
//! - [`serializer`]: Serialization context passed to every read/write
//! - [`frame`]: Kind-tagged framing used for dispatch

mod buffer;
mod error;
mod frame;
mod limits;
mod serializer;

pub use buffer::*;
pub use error::*;
pub use frame::*;
pub use limits::*;
pub use serializer::*;
