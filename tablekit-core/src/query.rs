//! Record list queries
//!
//! [`RecordQueryService`] builds and executes a filtered, ordered, limited
//! query against a named collection and maps every matched record through
//! the field projector.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, DataResult};
use crate::projector::{FieldResult, Projector, ReturnMode};
use crate::store::{OrderBy, OrderDirection, RecordStore};

/// Options for [`RecordQueryService::get_record_list`]
///
/// Wire format uses camelCase keys (`fieldList`, `orderBy`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    /// Collection to query
    pub collection: Option<String>,

    /// Single filter clause, appended after `queries`
    pub query: Option<String>,

    /// Filter clauses, AND-combined
    pub queries: Option<Vec<String>>,

    /// Fields to project; must be non-empty
    pub field_list: Vec<String>,

    /// Field to order by; ignored unless valid on the collection
    pub order_by: Option<String>,

    /// Sort polarity flag. The wire contract is inverted relative to the
    /// name: `false` orders descending, `true` ascending. Existing
    /// callers depend on this, so it is preserved as-is.
    pub order_descending: bool,

    /// Row cap; `-1` means unbounded
    pub max: i64,

    /// Which field representation to project
    pub return_value: ReturnMode,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            collection: None,
            query: None,
            queries: None,
            field_list: Vec::new(),
            order_by: None,
            order_descending: false,
            max: -1,
            return_value: ReturnMode::Value,
        }
    }
}

impl QueryOptions {
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

    /// Appends a single filter clause
    pub fn query(mut self, clause: impl Into<String>) -> Self {
        self.query = Some(clause.into());
        self
    }

    /// Sets the AND-combined filter clauses
    pub fn queries<I, S>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = Some(clauses.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the ordering field and polarity flag
    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(field.into());
        self.order_descending = descending;
        self
    }

    /// Caps the number of returned rows
    pub fn max(mut self, max: i64) -> Self {
        self.max = max;
        self
    }

    /// Sets the projected field representation
    pub fn return_value(mut self, mode: ReturnMode) -> Self {
        self.return_value = mode;
        self
    }
}

/// Queries record lists from a collection
pub struct RecordQueryService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> RecordQueryService<S> {
    /// Creates a query service over a record store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the projected fields of every record matching the options
    ///
    /// Validation fails before any store call. Results follow the store's
    /// iteration order, modified only by the `orderBy` clause.
    ///
    /// # Errors
    /// [`DataError::InvalidArgument`] when the collection is missing or
    /// the field list is empty.
    pub fn get_record_list(&self, options: &QueryOptions) -> DataResult<Vec<FieldResult>> {
        let collection = options.collection.as_deref().ok_or_else(|| {
            DataError::invalid_argument("No table provided or table is not a string")
        })?;
        if options.field_list.is_empty() {
            return Err(DataError::invalid_argument(
                "fieldList should be a non-empty array",
            ));
        }

        let mut filters: Vec<String> = options.queries.clone().unwrap_or_default();
        if let Some(clause) = &options.query {
            filters.push(clause.clone());
        }

        // The extractor choice depends only on the field list and return
        // mode, both known before the query runs, so the projector is
        // built once here rather than per record.
        let projector = Projector::new(&options.field_list, options.return_value);

        let order = match &options.order_by {
            Some(field) if self.store.is_valid_field(collection, field) => Some(OrderBy {
                field: field.clone(),
                direction: if options.order_descending {
                    OrderDirection::Ascending
                } else {
                    OrderDirection::Descending
                },
            }),
            _ => None,
        };

        let limit = usize::try_from(options.max).ok();

        debug!(
            collection,
            clauses = filters.len(),
            ordered = order.is_some(),
            "running record list query"
        );

        let records = self
            .store
            .query(collection, &filters, order.as_ref(), limit)?;

        Ok(records
            .iter()
            .map(|record| projector.project(record))
            .collect())
    }
}
