//! Tablekit Core
//!
//! This crate provides the server-side core of Tablekit: generic record
//! query/lookup/mutation services bound to an external record store, plus
//! the whitelist-gated RPC dispatcher that exposes those services to
//! remote callers.
//!
//! The record store itself is a collaborator behind the [`RecordStore`]
//! trait; this crate owns no persistence and no transport.

pub mod access;
pub mod error;
pub mod mutation;
pub mod projector;
pub mod query;
pub mod remote;
pub mod store;

// Public API exports
pub use access::{LookupOptions, RecordAccessService};
pub use error::{DataError, DataResult};
pub use mutation::{DeleteOptions, InsertOptions, RecordMutationService};
pub use projector::{FieldResult, ProjectedField, Projector, ReturnMode};
pub use query::{QueryOptions, RecordQueryService};
pub use remote::{BridgeConfig, Dispatcher, InvokeRequest, InvokeResponse, ResponseState};
pub use store::{DraftRecord, OrderBy, OrderDirection, RecordHandle, RecordStore};
