//! Client error types

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors surfaced by [`BridgeClient`](crate::BridgeClient) operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope
    #[error("{message}")]
    Rejected {
        /// Failure description from the response state
        message: String,
        /// Error payload carried alongside the state
        data: JsonValue,
    },

    /// The transport failed to deliver the request or response
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// A payload could not be serialized or deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other client-side failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// Creates a rejection from a response state message and payload
    pub fn rejected(message: impl Into<String>, data: JsonValue) -> Self {
        Self::Rejected {
            message: message.into(),
            data,
        }
    }

    /// Creates a transport failure
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}

/// Convenience alias for client results
pub type ClientResult<T> = Result<T, ClientError>;
