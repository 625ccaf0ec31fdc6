//! Single-record lookup
//!
//! [`RecordAccessService`] resolves one record by identifier, by
//! field/value match, or by query, and projects it through the field
//! projector. A miss is an absent result, never an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, DataResult};
use crate::projector::{FieldResult, Projector, ReturnMode};
use crate::query::{QueryOptions, RecordQueryService};
use crate::store::RecordStore;

/// Options for [`RecordAccessService::get_record`]
///
/// Lookups are tried in precedence order: `identifier`, then
/// `fieldName`/`fieldValue`, then `query`. The first lookup that
/// matches wins; a miss falls through to the next.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupOptions {
    /// Collection to look in
    pub collection: Option<String>,

    /// Record identifier for a direct fetch
    pub identifier: Option<String>,

    /// Field name for a field/value match
    pub field_name: Option<String>,

    /// Field value for a field/value match
    pub field_value: Option<String>,

    /// Filter clause; first match wins
    pub query: Option<String>,

    /// Fields to project; must be non-empty
    pub field_list: Vec<String>,

    /// Which field representation to project
    pub return_value: ReturnMode,
}

impl LookupOptions {
    /// Creates options for a collection with defaults everywhere else
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            ..Self::default()
        }
    }

    /// Sets the fields to project
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_list = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Looks up by record identifier
    pub fn identifier(mut self, id: impl Into<String>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    /// Looks up by field/value match
    pub fn field_match(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_name = Some(field.into());
        self.field_value = Some(value.into());
        self
    }

    /// Looks up by filter clause
    pub fn query(mut self, clause: impl Into<String>) -> Self {
        self.query = Some(clause.into());
        self
    }

    /// Sets the projected field representation
    pub fn return_value(mut self, mode: ReturnMode) -> Self {
        self.return_value = mode;
        self
    }
}

/// Resolves single records from a collection
pub struct RecordAccessService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> RecordAccessService<S> {
    /// Creates an access service over a record store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolves and projects a single record
    ///
    /// Each lookup returns only on a hit; a miss falls through to the
    /// next lookup. Returns `Ok(None)` when nothing matched, or when no
    /// lookup key was provided at all.
    ///
    /// # Errors
    /// [`DataError::InvalidArgument`] when the collection is missing or
    /// the field list is empty.
    pub fn get_record(&self, options: &LookupOptions) -> DataResult<Option<FieldResult>> {
        let collection = options.collection.as_deref().ok_or_else(|| {
            DataError::invalid_argument("Property collection is not provided to options argument")
        })?;
        if options.field_list.is_empty() {
            return Err(DataError::invalid_argument(
                "Property fieldList is an empty array",
            ));
        }

        let projector = Projector::new(&options.field_list, options.return_value);

        if let Some(id) = &options.identifier {
            debug!(collection, id = %id, "looking up record by identifier");
            if let Some(record) = self.store.get_by_id(collection, id)? {
                return Ok(Some(projector.project(&record)));
            }
        }

        if let (Some(field), Some(value)) = (&options.field_name, &options.field_value) {
            debug!(collection, field = %field, "looking up record by field match");
            if let Some(record) = self.store.get_by_field(collection, field, value)? {
                return Ok(Some(projector.project(&record)));
            }
        }

        if let Some(clause) = &options.query {
            debug!(collection, "looking up record by query");
            let list_options = QueryOptions::new(collection)
                .fields(options.field_list.clone())
                .query(clause.clone())
                .return_value(options.return_value)
                .max(1);
            let query_service = RecordQueryService::new(Arc::clone(&self.store));
            let mut rows = query_service.get_record_list(&list_options)?;
            if !rows.is_empty() {
                return Ok(Some(rows.remove(0)));
            }
        }

        Ok(None)
    }
}
