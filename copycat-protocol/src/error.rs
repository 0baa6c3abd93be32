//! Builder validation errors.

/// Errors raised while building a message.
///
/// Setters fail fast with [`BuildError::InvalidArgument`] when handed an
/// out-of-range value; `build()` fails with [`BuildError::InvalidState`] when a
/// required field was never set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A setter received a value outside the field's domain.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },

    /// `build()` was called before the message was complete.
    #[error("invalid state: `{field}` {reason}")]
    InvalidState {
        field: &'static str,
        reason: &'static str,
    },
}

impl BuildError {
    pub(crate) fn invalid_argument(field: &'static str, reason: &'static str) -> Self {
        BuildError::InvalidArgument { field, reason }
    }

    pub(crate) fn missing(field: &'static str) -> Self {
        BuildError::InvalidState {
            field,
            reason: "must be set",
        }
    }

    /// Get the name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            BuildError::InvalidArgument { field, .. } | BuildError::InvalidState { field, .. } => {
                field
            }
        }
    }
}

/// Reject negative values for a non-negative field.
pub(crate) fn non_negative(field: &'static str, value: i64) -> Result<i64, BuildError> {
    if value < 0 {
        return Err(BuildError::invalid_argument(field, "must not be negative"));
    }
    Ok(value)
}

/// Reject zero and negative values for a strictly positive field.
pub(crate) fn positive(field: &'static str, value: i64) -> Result<i64, BuildError> {
    if value <= 0 {
        return Err(BuildError::invalid_argument(field, "must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::invalid_argument("timeout", "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid argument `timeout`: must not be negative"
        );

        let err = BuildError::missing("client");
        assert_eq!(err.to_string(), "invalid state: `client` must be set");
        assert_eq!(err.field(), "client");
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(non_negative("timeout", 0), Ok(0));
        assert!(non_negative("timeout", -1).is_err());
        assert_eq!(positive("session", 1), Ok(1));
        assert!(positive("session", 0).is_err());
    }
}
