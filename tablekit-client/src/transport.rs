//! Request transports
//!
//! The client is transport-agnostic: anything that can carry one JSON
//! request string to a dispatcher and return the JSON response string
//! implements [`Transport`]. [`LoopbackTransport`] runs against an
//! in-process [`Dispatcher`] and is what the tests and demos use.

use std::fmt;

use async_trait::async_trait;
use tablekit_core::Dispatcher;

/// Failure raised by a transport while carrying a request
#[derive(Debug)]
pub struct TransportError {
    reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for TransportError {}

/// Carries one serialized request and returns the serialized response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: &str) -> Result<String, TransportError>;
}

/// Transport that invokes an in-process dispatcher directly
pub struct LoopbackTransport {
    dispatcher: Dispatcher,
}

impl LoopbackTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn call(&self, request: &str) -> Result<String, TransportError> {
        Ok(self.dispatcher.run(request))
    }
}
