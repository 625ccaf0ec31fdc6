//! Bridge wire envelope types
//!
//! Requests name a target service and method plus JSON arguments;
//! responses carry a state marker and a data payload. Both directions
//! are plain JSON text with camelCase keys.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Wire names of the standard record services
pub mod names {
    pub const QUERY_SERVICE: &str = "RecordQueryService";
    pub const ACCESS_SERVICE: &str = "RecordAccessService";
    pub const MUTATION_SERVICE: &str = "RecordMutationService";

    pub const GET_RECORD_LIST: &str = "getRecordList";
    pub const GET_RECORD: &str = "getRecord";
    pub const INSERT_RECORD: &str = "insertRecord";
    pub const DELETE_RECORDS: &str = "deleteRecords";
}

/// A method invocation sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    /// Target service name
    pub target_name: String,

    /// Method name on the target
    pub method_name: String,

    /// Arguments passed to the method
    #[serde(default)]
    pub method_args: JsonValue,

    /// Arguments passed to the target's constructor
    #[serde(default)]
    pub constructor_args: JsonValue,
}

impl InvokeRequest {
    /// Creates an invocation request
    pub fn new(
        target: impl Into<String>,
        method: impl Into<String>,
        method_args: JsonValue,
        constructor_args: JsonValue,
    ) -> Self {
        Self {
            target_name: target.into(),
            method_name: method.into(),
            method_args,
            constructor_args,
        }
    }

    /// Returns the `"Target.method"` whitelist key of this request
    pub fn key(&self) -> String {
        format!("{}.{}", self.target_name, self.method_name)
    }
}

/// Outcome marker carried by every response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseState {
    /// Whether the invocation failed
    pub has_error: bool,

    /// Failure description (absent on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A response sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Outcome marker
    pub state: ResponseState,

    /// Method return value, or `{}` on failure
    pub data: JsonValue,
}

impl InvokeResponse {
    /// Creates a success response carrying the method's return value
    pub fn success(data: JsonValue) -> Self {
        Self {
            state: ResponseState {
                has_error: false,
                message: None,
            },
            data,
        }
    }

    /// Creates a failure response with an empty data payload
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failure_with_data(message, json!({}))
    }

    /// Creates a failure response carrying an error payload
    pub fn failure_with_data(message: impl Into<String>, data: JsonValue) -> Self {
        Self {
            state: ResponseState {
                has_error: true,
                message: Some(message.into()),
            },
            data,
        }
    }
}
