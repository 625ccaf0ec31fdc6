//! Error types for Tablekit record services

use thiserror::Error;

/// Error type for record service operations
#[derive(Debug, Clone, Error)]
pub enum DataError {
    /// Malformed or missing required input, detected before any store call
    #[error("{message}")]
    InvalidArgument { message: String },

    /// The underlying record store rejected an operation
    #[error("Store error: {message}")]
    Store { message: String },

    /// Malformed wire envelope or unparseable payload
    #[error("Protocol error: {message}")]
    Protocol { message: String },
}

impl DataError {
    /// Creates an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns the stable error code used in failure envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Store { .. } => "store_error",
            Self::Protocol { .. } => "protocol_error",
        }
    }
}

/// Result type for record service operations
pub type DataResult<T> = Result<T, DataError>;

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Protocol {
            message: format!("JSON error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DataError::invalid_argument("bad input").code(),
            "invalid_argument"
        );
        assert_eq!(DataError::store("declined").code(), "store_error");
        assert_eq!(DataError::protocol("bad json").code(), "protocol_error");
    }

    #[test]
    fn test_invalid_argument_display_is_bare_message() {
        let err = DataError::invalid_argument("fieldList should be a non-empty array");
        assert_eq!(err.to_string(), "fieldList should be a non-empty array");
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DataError = err.into();
        assert_eq!(err.code(), "protocol_error");
    }
}
