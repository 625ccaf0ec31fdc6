//! Record store collaborator traits
//!
//! Tablekit owns no storage. Every read and write goes through the
//! [`RecordStore`] trait, implemented by whatever engine hosts the
//! records (see `tablekit-memstore` for an in-memory implementation).
//!
//! Filter clauses are opaque strings interpreted by the store; the
//! services only collect and AND-combine them.

use serde_json::Value as JsonValue;

use crate::error::DataResult;

/// Sort direction for an ordered query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Ordering clause applied to a query
#[derive(Debug, Clone)]
pub struct OrderBy {
    /// Field to order by (must be valid per [`RecordStore::is_valid_field`])
    pub field: String,

    /// Sort direction
    pub direction: OrderDirection,
}

/// Read access to a single resolved record
///
/// A handle may point at a row owned by the store; cloning a handle is
/// cheap and never copies the underlying collection.
pub trait RecordHandle: Clone {
    /// Returns the raw value of a field, or JSON null if absent
    fn value(&self, field: &str) -> JsonValue;

    /// Returns the human-readable display value of a field
    ///
    /// Stores without a separate display representation return the raw
    /// value here.
    fn display_value(&self, field: &str) -> JsonValue;

    /// Resolves a reference field to the related record it points at
    ///
    /// Returns `None` when the field is not a reference or the referenced
    /// record no longer exists.
    fn related(&self, field: &str) -> Option<Self>
    where
        Self: Sized;
}

/// A not-yet-persisted record under construction
pub trait DraftRecord {
    /// Sets a field on the draft, replacing any previous value
    fn set_field(&mut self, field: &str, value: JsonValue);
}

/// External record store consumed by the Tablekit services
pub trait RecordStore {
    /// Resolved record handle type
    type Record: RecordHandle;

    /// Draft type produced by [`RecordStore::create`]
    type Draft: DraftRecord;

    /// Runs a filtered, ordered, limited query against a collection
    ///
    /// All filter clauses are AND-combined. `limit` of `None` means
    /// unbounded. Results come back in the store's natural iteration
    /// order, modified only by `order`.
    fn query(
        &self,
        collection: &str,
        filters: &[String],
        order: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> DataResult<Vec<Self::Record>>;

    /// Fetches a single record by its identifier
    fn get_by_id(&self, collection: &str, id: &str) -> DataResult<Option<Self::Record>>;

    /// Fetches the first record whose field equals the given value
    fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> DataResult<Option<Self::Record>>;

    /// Returns whether a field name is valid on a collection
    fn is_valid_field(&self, collection: &str, field: &str) -> bool;

    /// Starts a new draft record in a collection
    fn create(&self, collection: &str) -> DataResult<Self::Draft>;

    /// Persists a draft, returning the assigned identifier
    ///
    /// Returns `Ok(None)` when the store declines the insert.
    fn persist(&self, draft: Self::Draft) -> DataResult<Option<String>>;

    /// Deletes every record matching the query, returning the count
    fn delete_matching(&self, collection: &str, query: &str) -> DataResult<u64>;
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Stores used by service unit tests.
    //!
    //! `UnreachableStore` panics on every operation, proving that
    //! validation failures happen before any store call.

    use super::*;

    /// Record handle whose fields are all null
    #[derive(Debug, Clone)]
    pub struct NullRecord;

    impl RecordHandle for NullRecord {
        fn value(&self, _field: &str) -> JsonValue {
            JsonValue::Null
        }

        fn display_value(&self, _field: &str) -> JsonValue {
            JsonValue::Null
        }

        fn related(&self, _field: &str) -> Option<Self> {
            None
        }
    }

    /// Draft that accepts fields and discards them
    pub struct NullDraft;

    impl DraftRecord for NullDraft {
        fn set_field(&mut self, _field: &str, _value: JsonValue) {}
    }

    /// Store that panics on every operation
    pub struct UnreachableStore;

    impl RecordStore for UnreachableStore {
        type Record = NullRecord;
        type Draft = NullDraft;

        fn query(
            &self,
            _collection: &str,
            _filters: &[String],
            _order: Option<&OrderBy>,
            _limit: Option<usize>,
        ) -> DataResult<Vec<Self::Record>> {
            panic!("store queried before validation completed");
        }

        fn get_by_id(&self, _collection: &str, _id: &str) -> DataResult<Option<Self::Record>> {
            panic!("store read before validation completed");
        }

        fn get_by_field(
            &self,
            _collection: &str,
            _field: &str,
            _value: &str,
        ) -> DataResult<Option<Self::Record>> {
            panic!("store read before validation completed");
        }

        fn is_valid_field(&self, _collection: &str, _field: &str) -> bool {
            panic!("store consulted before validation completed");
        }

        fn create(&self, _collection: &str) -> DataResult<Self::Draft> {
            panic!("store written before validation completed");
        }

        fn persist(&self, _draft: Self::Draft) -> DataResult<Option<String>> {
            panic!("store written before validation completed");
        }

        fn delete_matching(&self, _collection: &str, _query: &str) -> DataResult<u64> {
            panic!("store written before validation completed");
        }
    }
}
