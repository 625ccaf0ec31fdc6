//! Field projection
//!
//! Converts a resolved record into a field/value mapping per a configured
//! field list and return mode. Field names may be dotted paths
//! (`caller.department.name`), where each segment before the last walks a
//! record reference.
//!
//! The extractor is chosen once, when the projector is built: splitting a
//! field name and walking references costs more than a direct lookup, so
//! the dotted extractor is only used when at least one field name
//! actually contains a path separator. Both extractors produce identical
//! output for plain field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::store::RecordHandle;

/// Which representation of a field to project
///
/// Any unrecognized wire string deserializes as [`ReturnMode::Both`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnMode {
    /// Raw value only
    #[default]
    Value,
    /// Display value only
    Display,
    /// Both, as a `{value, display}` object
    Both,
}

impl ReturnMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Display => "display",
            Self::Both => "both",
        }
    }
}

impl Serialize for ReturnMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReturnMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "value" => Self::Value,
            "display" => Self::Display,
            _ => Self::Both,
        })
    }
}

/// A single projected field: a bare scalar, or a value/display pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectedField {
    /// Value and display value together (`returnValue: both`)
    Pair {
        value: JsonValue,
        display: JsonValue,
    },
    /// Raw value or display value alone
    Scalar(JsonValue),
}

/// Projection of one record: field name to projected value
pub type FieldResult = BTreeMap<String, ProjectedField>;

/// Converts records into [`FieldResult`] mappings
///
/// Built once per service call and applied to every matched record.
/// Read-only over the records it is given.
#[derive(Debug, Clone)]
pub struct Projector {
    fields: Vec<String>,
    mode: ReturnMode,
    dotted: bool,
}

impl Projector {
    /// Builds a projector for a field list and return mode
    pub fn new(fields: &[String], mode: ReturnMode) -> Self {
        let dotted = fields.iter().any(|field| field.contains('.'));
        Self {
            fields: fields.to_vec(),
            mode,
            dotted,
        }
    }

    /// Projects a record into a field/value mapping
    pub fn project<R: RecordHandle>(&self, record: &R) -> FieldResult {
        self.fields
            .iter()
            .map(|field| {
                let projected = if self.dotted {
                    self.traverse(record, field)
                } else {
                    self.direct(record, field)
                };
                (field.clone(), projected)
            })
            .collect()
    }

    /// Direct extractor: plain field lookup on the record itself
    fn direct<R: RecordHandle>(&self, record: &R, field: &str) -> ProjectedField {
        match self.mode {
            ReturnMode::Value => ProjectedField::Scalar(record.value(field)),
            ReturnMode::Display => ProjectedField::Scalar(record.display_value(field)),
            ReturnMode::Both => ProjectedField::Pair {
                value: record.value(field),
                display: record.display_value(field),
            },
        }
    }

    /// Dotted extractor: walk reference segments, then read the leaf
    ///
    /// Folds over the path, each step resolving the next related record.
    /// A missing reference or empty segment projects null.
    fn traverse<R: RecordHandle>(&self, record: &R, field: &str) -> ProjectedField {
        let (path, leaf) = match field.rfind('.') {
            Some(idx) => (&field[..idx], &field[idx + 1..]),
            None => ("", field),
        };

        let mut current = record.clone();
        if !path.is_empty() {
            for segment in path.split('.') {
                match current.related(segment) {
                    Some(next) => current = next,
                    None => return self.null_field(),
                }
            }
        }

        self.direct(&current, leaf)
    }

    fn null_field(&self) -> ProjectedField {
        match self.mode {
            ReturnMode::Both => ProjectedField::Pair {
                value: JsonValue::Null,
                display: JsonValue::Null,
            },
            _ => ProjectedField::Scalar(JsonValue::Null),
        }
    }
}
