//! Tablekit Client
//!
//! Client-side proxy for the Tablekit bridge: builds invoke envelopes,
//! ships them over a pluggable [`Transport`], and turns response states
//! into ordinary `Result`s. Pairs with the dispatcher in
//! `tablekit-core`.

pub mod bridge;
pub mod error;
pub mod transport;

pub use bridge::BridgeClient;
pub use error::{ClientError, ClientResult};
pub use transport::{LoopbackTransport, Transport, TransportError};
