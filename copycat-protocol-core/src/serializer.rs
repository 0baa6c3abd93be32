//! Serialization context.

use crate::limits::MessageLimits;

/// Context handed to every message read and write.
///
/// Messages encode their fields through the buffer primitives directly; the
/// context carries the settings that apply to a whole connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Serializer {
    limits: MessageLimits,
}

impl Serializer {
    /// Create a serializer with no size limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message size limits.
    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the configured message size limits.
    pub fn limits(&self) -> &MessageLimits {
        &self.limits
    }
}
