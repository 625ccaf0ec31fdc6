//! Remote invocation bridge, server side
//!
//! Wire envelope types, the whitelist configuration, and the registry
//! dispatcher that exposes record services to remote callers. The
//! transport that delivers the raw request strings lives outside this
//! crate; see `tablekit-client` for the caller side.

mod config;
mod dispatcher;
mod protocol;

pub use config::{BridgeConfig, DEFAULT_WHITELIST};
pub use dispatcher::{Dispatcher, MethodHandler};
pub use protocol::{names, InvokeRequest, InvokeResponse, ResponseState};
