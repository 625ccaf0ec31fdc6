//! Record mutations
//!
//! [`RecordMutationService`] inserts a new record from a field/value
//! mapping and bulk-deletes records matching a query. Both operations
//! validate their options before touching the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{DataError, DataResult};
use crate::store::{DraftRecord, RecordStore};

/// Options for [`RecordMutationService::insert_record`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsertOptions {
    /// Collection to insert into
    pub collection: Option<String>,

    /// Field/value pairs for the new record
    pub values: Option<BTreeMap<String, JsonValue>>,
}

impl InsertOptions {
    /// Creates insert options for a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            values: Some(BTreeMap::new()),
        }
    }

    /// Adds a field/value pair
    pub fn value(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), value.into());
        self
    }
}

/// Options for [`RecordMutationService::delete_records`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteOptions {
    /// Collection to delete from
    pub collection: Option<String>,

    /// Filter clause selecting the records to delete
    pub query: Option<String>,
}

impl DeleteOptions {
    /// Creates delete options for a collection and query
    pub fn new(collection: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            query: Some(query.into()),
        }
    }
}

/// Inserts and deletes records in a collection
pub struct RecordMutationService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> RecordMutationService<S> {
    /// Creates a mutation service over a record store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates one record from a field/value mapping
    ///
    /// Returns the identifier assigned by the store, or `Ok(None)` when
    /// the store declines the insert.
    ///
    /// # Errors
    /// [`DataError::InvalidArgument`] when the collection or values are
    /// missing.
    pub fn insert_record(&self, options: &InsertOptions) -> DataResult<Option<String>> {
        let collection = options.collection.as_deref().ok_or_else(|| {
            DataError::invalid_argument("No table provided or table is not a string")
        })?;
        let values = options.values.as_ref().ok_or_else(|| {
            DataError::invalid_argument("No values provided or values is not an object")
        })?;

        let mut draft = self.store.create(collection)?;
        for (field, value) in values {
            draft.set_field(field, value.clone());
        }

        let id = self.store.persist(draft)?;
        match &id {
            Some(id) => info!(collection, id = %id, "inserted record"),
            None => debug!(collection, "store declined insert"),
        }
        Ok(id)
    }

    /// Deletes every record matching the query
    ///
    /// Destructive and irreversible. Returns the number of deleted
    /// records.
    ///
    /// # Errors
    /// [`DataError::InvalidArgument`] when the collection or query is
    /// missing.
    pub fn delete_records(&self, options: &DeleteOptions) -> DataResult<u64> {
        let collection = options.collection.as_deref().ok_or_else(|| {
            DataError::invalid_argument("No table provided or table is not a string")
        })?;
        let query = options.query.as_deref().ok_or_else(|| {
            DataError::invalid_argument("No query provided or query is not a string")
        })?;

        let count = self.store.delete_matching(collection, query)?;
        info!(collection, count, "deleted matching records");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::UnreachableStore;

    #[test]
    fn test_insert_missing_collection_fails_before_store_write() {
        let service = RecordMutationService::new(Arc::new(UnreachableStore));
        let options = InsertOptions {
            collection: None,
            values: Some(BTreeMap::new()),
        };

        let err = service.insert_record(&options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No table provided or table is not a string"
        );
    }

    #[test]
    fn test_insert_missing_values_fails_before_store_write() {
        let service = RecordMutationService::new(Arc::new(UnreachableStore));
        let options = InsertOptions {
            collection: Some("task".to_string()),
            values: None,
        };

        let err = service.insert_record(&options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No values provided or values is not an object"
        );
    }

    #[test]
    fn test_delete_missing_query_fails_before_store_write() {
        let service = RecordMutationService::new(Arc::new(UnreachableStore));
        let options = DeleteOptions {
            collection: Some("task".to_string()),
            query: None,
        };

        let err = service.delete_records(&options).unwrap_err();
        assert_eq!(err.to_string(), "No query provided or query is not a string");
    }

    #[test]
    fn test_insert_options_builder() {
        let options = InsertOptions::new("task")
            .value("name", "Test")
            .value("priority", 1);
        let values = options.values.unwrap();
        assert_eq!(values["name"], serde_json::json!("Test"));
        assert_eq!(values["priority"], serde_json::json!(1));
    }
}
