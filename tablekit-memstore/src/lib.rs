//! In-memory record store
//!
//! A thread-safe [`RecordStore`] implementation backed by plain maps,
//! used as the reference collaborator in tests and demos. Records carry
//! per-field display values and references to rows in other collections,
//! so dotted-path projection can be exercised end to end.
//!
//! # Filter clauses
//!
//! A clause string holds one or more `field=value` / `field!=value`
//! conditions joined by `^`; all conditions are AND-combined. An empty
//! clause matches every record.
//!
//! # Example
//!
//! ```rust
//! use tablekit_memstore::{MemoryStore, RecordSeed};
//!
//! let store = MemoryStore::new();
//! store.seed(
//!     "task",
//!     "t1",
//!     RecordSeed::new().field("number", "TASK0001").field("state", 2),
//! );
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value as JsonValue;

use tablekit_core::{
    DataError, DataResult, DraftRecord, OrderBy, OrderDirection, RecordHandle, RecordStore,
};

/// One stored field: raw value, optional display value, optional
/// reference to a row in another collection
#[derive(Debug, Clone)]
struct StoredField {
    value: JsonValue,
    display: Option<JsonValue>,
    reference: Option<(String, String)>,
}

impl StoredField {
    fn plain(value: JsonValue) -> Self {
        Self {
            value,
            display: None,
            reference: None,
        }
    }
}

/// Fluent builder for seeding one record
#[derive(Debug, Clone, Default)]
pub struct RecordSeed {
    fields: BTreeMap<String, StoredField>,
}

impl RecordSeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field's raw value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields
            .insert(name.into(), StoredField::plain(value.into()));
        self
    }

    /// Sets a field's display value, keeping its raw value
    pub fn display(mut self, name: impl Into<String>, display: impl Into<JsonValue>) -> Self {
        let entry = self
            .fields
            .entry(name.into())
            .or_insert_with(|| StoredField::plain(JsonValue::Null));
        entry.display = Some(display.into());
        self
    }

    /// Makes a field a reference to a row in another collection
    ///
    /// The field's raw value becomes the referenced identifier.
    pub fn reference(
        mut self,
        name: impl Into<String>,
        collection: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        let collection = collection.into();
        let id = id.into();
        self.fields.insert(
            name.into(),
            StoredField {
                value: JsonValue::String(id.clone()),
                display: None,
                reference: Some((collection, id)),
            },
        );
        self
    }
}

#[derive(Debug, Clone)]
struct Row {
    id: String,
    fields: BTreeMap<String, StoredField>,
}

#[derive(Debug, Default)]
struct Collection {
    rows: Vec<Row>,
    next_id: u64,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    read_only: HashSet<String>,
}

/// Thread-safe in-memory record store
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record with an explicit identifier
    pub fn seed(&self, collection: &str, id: &str, seed: RecordSeed) {
        self.write()
            .collections
            .entry(collection.to_string())
            .or_default()
            .rows
            .push(Row {
                id: id.to_string(),
                fields: seed.fields,
            });
    }

    /// Makes a collection decline all inserts
    pub fn mark_read_only(&self, collection: &str) {
        self.write().read_only.insert(collection.to_string());
    }

    /// Returns the number of rows in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.read()
            .collections
            .get(collection)
            .map(|c| c.rows.len())
            .unwrap_or(0)
    }

    /// Returns whether a collection has no rows
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    // The maps are consistent whenever a guard drops, so a poisoned
    // lock is recovered instead of dropping or failing the operation.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, row: Row) -> MemRecord {
        MemRecord {
            inner: Arc::clone(&self.inner),
            row,
        }
    }
}

/// Handle to one resolved in-memory record
#[derive(Debug, Clone)]
pub struct MemRecord {
    inner: Arc<RwLock<Inner>>,
    row: Row,
}

impl MemRecord {
    /// Returns the record's identifier
    pub fn id(&self) -> &str {
        &self.row.id
    }
}

impl RecordHandle for MemRecord {
    fn value(&self, field: &str) -> JsonValue {
        self.row
            .fields
            .get(field)
            .map(|f| f.value.clone())
            .unwrap_or(JsonValue::Null)
    }

    fn display_value(&self, field: &str) -> JsonValue {
        self.row
            .fields
            .get(field)
            .map(|f| f.display.clone().unwrap_or_else(|| f.value.clone()))
            .unwrap_or(JsonValue::Null)
    }

    fn related(&self, field: &str) -> Option<Self> {
        let (collection, id) = self.row.fields.get(field)?.reference.clone()?;
        let inner = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let row = inner
            .collections
            .get(&collection)?
            .rows
            .iter()
            .find(|row| row.id == id)?
            .clone();
        drop(inner);
        Some(Self {
            inner: Arc::clone(&self.inner),
            row,
        })
    }
}

/// Draft record produced by [`MemoryStore::create`]
#[derive(Debug)]
pub struct MemDraft {
    collection: String,
    fields: BTreeMap<String, StoredField>,
}

impl DraftRecord for MemDraft {
    fn set_field(&mut self, field: &str, value: JsonValue) {
        self.fields
            .insert(field.to_string(), StoredField::plain(value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone)]
struct Condition {
    field: String,
    op: Op,
    expected: String,
}

impl Condition {
    fn matches(&self, row: &Row) -> bool {
        let actual = row
            .fields
            .get(&self.field)
            .map(|f| f.value.clone())
            .unwrap_or(JsonValue::Null);
        let equal = value_matches(&actual, &self.expected);
        match self.op {
            Op::Equals => equal,
            Op::NotEquals => !equal,
        }
    }
}

/// Parses a clause string into AND-combined conditions
fn parse_clause(raw: &str) -> DataResult<Vec<Condition>> {
    raw.split('^')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Some((field, expected)) = part.split_once("!=") {
                Ok(Condition {
                    field: field.to_string(),
                    op: Op::NotEquals,
                    expected: expected.to_string(),
                })
            } else if let Some((field, expected)) = part.split_once('=') {
                Ok(Condition {
                    field: field.to_string(),
                    op: Op::Equals,
                    expected: expected.to_string(),
                })
            } else {
                Err(DataError::store(format!(
                    "unsupported filter clause: {}",
                    part
                )))
            }
        })
        .collect()
}

fn value_matches(actual: &JsonValue, expected: &str) -> bool {
    match actual {
        JsonValue::String(s) => s == expected,
        JsonValue::Number(n) => expected
            .parse::<f64>()
            .map(|e| n.as_f64() == Some(e))
            .unwrap_or(false),
        JsonValue::Bool(b) => expected.parse::<bool>().map(|e| *b == e).unwrap_or(false),
        JsonValue::Null => expected.is_empty(),
        other => other.to_string() == expected,
    }
}

fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => sort_key(a).cmp(&sort_key(b)),
    }
}

fn sort_key(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RecordStore for MemoryStore {
    type Record = MemRecord;
    type Draft = MemDraft;

    fn query(
        &self,
        collection: &str,
        filters: &[String],
        order: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> DataResult<Vec<Self::Record>> {
        let conditions: Vec<Condition> = filters
            .iter()
            .map(|clause| parse_clause(clause))
            .collect::<DataResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        let mut rows: Vec<Row> = self
            .read()
            .collections
            .get(collection)
            .map(|c| c.rows.clone())
            .unwrap_or_default();

        rows.retain(|row| conditions.iter().all(|c| c.matches(row)));

        if let Some(order) = order {
            // Stable sort keeps the seeded order for equal keys.
            rows.sort_by(|a, b| {
                let left = a
                    .fields
                    .get(&order.field)
                    .map(|f| f.value.clone())
                    .unwrap_or(JsonValue::Null);
                let right = b
                    .fields
                    .get(&order.field)
                    .map(|f| f.value.clone())
                    .unwrap_or(JsonValue::Null);
                let ordering = compare_values(&left, &right);
                match order.direction {
                    OrderDirection::Ascending => ordering,
                    OrderDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        Ok(rows.into_iter().map(|row| self.handle(row)).collect())
    }

    fn get_by_id(&self, collection: &str, id: &str) -> DataResult<Option<Self::Record>> {
        let row = self
            .read()
            .collections
            .get(collection)
            .and_then(|c| c.rows.iter().find(|row| row.id == id).cloned());
        Ok(row.map(|row| self.handle(row)))
    }

    fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> DataResult<Option<Self::Record>> {
        let row = self.read().collections.get(collection).and_then(|c| {
            c.rows
                .iter()
                .find(|row| {
                    row.fields
                        .get(field)
                        .map(|f| value_matches(&f.value, value))
                        .unwrap_or(false)
                })
                .cloned()
        });
        Ok(row.map(|row| self.handle(row)))
    }

    fn is_valid_field(&self, collection: &str, field: &str) -> bool {
        self.read()
            .collections
            .get(collection)
            .map(|c| c.rows.iter().any(|row| row.fields.contains_key(field)))
            .unwrap_or(false)
    }

    fn create(&self, collection: &str) -> DataResult<Self::Draft> {
        Ok(MemDraft {
            collection: collection.to_string(),
            fields: BTreeMap::new(),
        })
    }

    fn persist(&self, draft: Self::Draft) -> DataResult<Option<String>> {
        let mut inner = self.write();
        if inner.read_only.contains(&draft.collection) {
            return Ok(None);
        }

        let entry = inner.collections.entry(draft.collection).or_default();
        entry.next_id += 1;
        let id = format!("mem{:04}", entry.next_id);
        entry.rows.push(Row {
            id: id.clone(),
            fields: draft.fields,
        });
        Ok(Some(id))
    }

    fn delete_matching(&self, collection: &str, query: &str) -> DataResult<u64> {
        let conditions = parse_clause(query)?;
        let mut inner = self.write();
        let Some(entry) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = entry.rows.len();
        entry
            .rows
            .retain(|row| !conditions.iter().all(|c| c.matches(row)));
        Ok((before - entry.rows.len()) as u64)
    }
}
