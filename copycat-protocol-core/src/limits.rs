//! Message size limits for encoded frames.
//!
//! # Receive vs Send Limits
//!
//! - **Receive limit** (`receive_max_bytes`): Limits the size of incoming frames
//!   before any message field is decoded.
//! - **Send limit** (`send_max_bytes`): Limits the size of outgoing frames after
//!   encoding, so a peer never receives a frame it is configured to refuse.

use serde::Deserialize;

use crate::error::ProtocolError;

/// Configuration for message size limits.
///
/// By default, no limits are applied. Use the builder methods to set limits, or
/// deserialize from a configuration file:
///
/// ```
/// use copycat_protocol_core::MessageLimits;
///
/// let limits = MessageLimits::new()
///     .receive_max_bytes(16 * 1024 * 1024)
///     .send_max_bytes(8 * 1024 * 1024);
/// assert_eq!(limits.get_send_max_bytes(), Some(8 * 1024 * 1024));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageLimits {
    /// Maximum size of incoming frames in bytes.
    receive_max_bytes: Option<usize>,
    /// Maximum size of outgoing frames in bytes.
    send_max_bytes: Option<usize>,
}

impl MessageLimits {
    /// Create new limits with no restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum size for incoming frames.
    pub fn receive_max_bytes(mut self, max: usize) -> Self {
        self.receive_max_bytes = Some(max);
        self
    }

    /// Set the maximum size for outgoing frames.
    pub fn send_max_bytes(mut self, max: usize) -> Self {
        self.send_max_bytes = Some(max);
        self
    }

    /// Returns the maximum receive frame size, or `None` if unlimited.
    pub fn get_receive_max_bytes(&self) -> Option<usize> {
        self.receive_max_bytes
    }

    /// Returns the maximum send frame size, or `None` if unlimited.
    pub fn get_send_max_bytes(&self) -> Option<usize> {
        self.send_max_bytes
    }

    /// Check an incoming frame size against the receive limit.
    pub fn check_receive_size(&self, size: usize) -> Result<(), ProtocolError> {
        if let Some(max) = self.receive_max_bytes
            && size > max
        {
            return Err(ProtocolError::MessageTooLarge { size, max });
        }
        Ok(())
    }

    /// Check an outgoing frame size against the send limit.
    pub fn check_send_size(&self, size: usize) -> Result<(), ProtocolError> {
        if let Some(max) = self.send_max_bytes
            && size > max
        {
            return Err(ProtocolError::MessageTooLarge { size, max });
        }
        Ok(())
    }
}
