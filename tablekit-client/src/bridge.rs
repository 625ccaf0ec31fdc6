//! Bridge client proxy
//!
//! [`BridgeClient`] serializes method invocations into the bridge wire
//! envelope, sends them over a [`Transport`], and unpacks the response.
//! Responses missing a parseable state get one synthesized so callers
//! always see a uniform outcome.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use tablekit_core::remote::names;
use tablekit_core::{
    DeleteOptions, FieldResult, InsertOptions, InvokeRequest, LookupOptions, QueryOptions,
    ResponseState,
};

use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// Message used when the server response carries no usable state
const NO_STATE_MESSAGE: &str = "Uncaught error - no response state available";

/// Client-side proxy for remote record services
pub struct BridgeClient<T: Transport> {
    transport: T,
}

impl<T: Transport> BridgeClient<T> {
    /// Creates a client over a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Invokes a remote method and returns its data payload
    ///
    /// # Errors
    /// [`ClientError::Rejected`] when the response state reports an
    /// error or is missing entirely, [`ClientError::Transport`] when the
    /// transport fails.
    pub async fn invoke(
        &self,
        target: &str,
        method: &str,
        method_args: JsonValue,
        constructor_args: JsonValue,
    ) -> ClientResult<JsonValue> {
        let request = InvokeRequest::new(target, method, method_args, constructor_args);
        let raw = serde_json::to_string(&request)?;

        debug!(key = %request.key(), "invoking remote method");
        let reply = self
            .transport
            .call(&raw)
            .await
            .map_err(|err| ClientError::transport(err.to_string()))?;

        let mut response: JsonValue = serde_json::from_str(&reply)?;

        let state = response
            .get("state")
            .cloned()
            .and_then(|state| serde_json::from_value::<ResponseState>(state).ok())
            .unwrap_or_else(|| {
                warn!(key = %request.key(), "response carried no parseable state");
                ResponseState {
                    has_error: true,
                    message: Some(NO_STATE_MESSAGE.to_string()),
                }
            });

        let data = response
            .get_mut("data")
            .map(JsonValue::take)
            .unwrap_or(JsonValue::Null);

        if state.has_error {
            let message = state.message.unwrap_or_else(|| NO_STATE_MESSAGE.to_string());
            return Err(ClientError::rejected(message, data));
        }
        Ok(data)
    }

    /// Queries a collection and returns the projected records
    pub async fn get_record_list(&self, options: &QueryOptions) -> ClientResult<Vec<FieldResult>> {
        self.invoke_typed(names::QUERY_SERVICE, names::GET_RECORD_LIST, options)
            .await
    }

    /// Resolves a single record, if any lookup matched
    pub async fn get_record(&self, options: &LookupOptions) -> ClientResult<Option<FieldResult>> {
        self.invoke_typed(names::ACCESS_SERVICE, names::GET_RECORD, options)
            .await
    }

    /// Inserts a record and returns its assigned identifier
    pub async fn insert_record(&self, options: &InsertOptions) -> ClientResult<Option<String>> {
        self.invoke_typed(names::MUTATION_SERVICE, names::INSERT_RECORD, options)
            .await
    }

    /// Deletes matching records and returns the deleted count
    pub async fn delete_records(&self, options: &DeleteOptions) -> ClientResult<u64> {
        self.invoke_typed(names::MUTATION_SERVICE, names::DELETE_RECORDS, options)
            .await
    }

    async fn invoke_typed<O, R>(&self, target: &str, method: &str, options: &O) -> ClientResult<R>
    where
        O: Serialize,
        R: DeserializeOwned,
    {
        let args = serde_json::to_value(options)?;
        let data = self
            .invoke(target, method, args, JsonValue::Object(Default::default()))
            .await?;
        Ok(serde_json::from_value(data)?)
    }
}
