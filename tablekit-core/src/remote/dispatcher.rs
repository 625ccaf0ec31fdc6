//! Bridge dispatcher
//!
//! Dynamic dispatch by name, done as a registry: `"Target.method"` keys
//! map to handler closures registered at startup. The whitelist check is
//! a membership test against the injected [`BridgeConfig`]; a request
//! must pass it before the registry is even consulted.
//!
//! Handler failures never escape as errors: every outcome, including a
//! malformed request, is serialized into a well-formed response
//! envelope.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::access::{LookupOptions, RecordAccessService};
use crate::error::{DataError, DataResult};
use crate::mutation::{DeleteOptions, InsertOptions, RecordMutationService};
use crate::query::{QueryOptions, RecordQueryService};
use crate::remote::config::BridgeConfig;
use crate::remote::protocol::{names, InvokeRequest, InvokeResponse};
use crate::store::RecordStore;

/// Handler invoked for one registered `"Target.method"` key
///
/// Receives `(constructorArgs, methodArgs)` and returns the method's
/// JSON result.
pub type MethodHandler =
    Box<dyn Fn(&JsonValue, &JsonValue) -> DataResult<JsonValue> + Send + Sync>;

/// Server-side bridge dispatcher
pub struct Dispatcher {
    handlers: HashMap<String, MethodHandler>,
    config: BridgeConfig,
}

impl Dispatcher {
    /// Creates an empty dispatcher with the given whitelist
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            config,
        }
    }

    /// Creates a dispatcher with the standard record services registered
    ///
    /// Registers `RecordQueryService.getRecordList`,
    /// `RecordAccessService.getRecord`,
    /// `RecordMutationService.insertRecord` and
    /// `RecordMutationService.deleteRecords` over the given store. Which
    /// of them are callable is still governed by the whitelist.
    pub fn with_standard_services<S>(store: Arc<S>, config: BridgeConfig) -> Self
    where
        S: RecordStore + Send + Sync + 'static,
    {
        let mut dispatcher = Self::new(config);

        let query_service = RecordQueryService::new(Arc::clone(&store));
        dispatcher.register(
            names::QUERY_SERVICE,
            names::GET_RECORD_LIST,
            move |_ctor, args| {
                let options: QueryOptions = parse_options(args)?;
                let rows = query_service.get_record_list(&options)?;
                Ok(serde_json::to_value(rows)?)
            },
        );

        let access_service = RecordAccessService::new(Arc::clone(&store));
        dispatcher.register(
            names::ACCESS_SERVICE,
            names::GET_RECORD,
            move |_ctor, args| {
                let options: LookupOptions = parse_options(args)?;
                let record = access_service.get_record(&options)?;
                Ok(serde_json::to_value(record)?)
            },
        );

        let mutation_service = RecordMutationService::new(Arc::clone(&store));
        dispatcher.register(
            names::MUTATION_SERVICE,
            names::INSERT_RECORD,
            move |_ctor, args| {
                let options: InsertOptions = parse_options(args)?;
                let id = mutation_service.insert_record(&options)?;
                Ok(serde_json::to_value(id)?)
            },
        );

        let mutation_service = RecordMutationService::new(store);
        dispatcher.register(
            names::MUTATION_SERVICE,
            names::DELETE_RECORDS,
            move |_ctor, args| {
                let options: DeleteOptions = parse_options(args)?;
                let count = mutation_service.delete_records(&options)?;
                Ok(serde_json::to_value(count)?)
            },
        );

        dispatcher
    }

    /// Registers a handler for a `"Target.method"` key
    ///
    /// A later registration for the same key replaces the earlier one.
    pub fn register<F>(&mut self, target: &str, method: &str, handler: F)
    where
        F: Fn(&JsonValue, &JsonValue) -> DataResult<JsonValue> + Send + Sync + 'static,
    {
        self.handlers
            .insert(format!("{}.{}", target, method), Box::new(handler));
    }

    /// Dispatches a parsed request to its registered handler
    pub fn dispatch(&self, request: &InvokeRequest) -> InvokeResponse {
        let key = request.key();

        if !self.config.is_allowed(&key) {
            warn!(%key, "rejected invocation: not whitelisted");
            return InvokeResponse::failure(format!("{} is not whitelisted.", key));
        }

        let Some(handler) = self.handlers.get(&key) else {
            warn!(%key, "rejected invocation: whitelisted but not registered");
            return InvokeResponse::failure(format!("{} is not registered.", key));
        };

        debug!(%key, "dispatching invocation");
        match handler(&request.constructor_args, &request.method_args) {
            Ok(data) => InvokeResponse::success(data),
            Err(err) => {
                warn!(%key, error = %err, "invocation failed");
                InvokeResponse::failure_with_data(
                    err.to_string(),
                    json!({
                        "code": err.code(),
                        "message": err.to_string(),
                    }),
                )
            }
        }
    }

    /// Runs one raw request and returns the serialized response
    ///
    /// Never fails: malformed requests become failure envelopes.
    pub fn run(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<InvokeRequest>(raw) {
            Ok(request) => self.dispatch(&request),
            Err(err) => {
                warn!(error = %err, "unparseable invoke request");
                InvokeResponse::failure(format!("Malformed invoke request: {}", err))
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"state":{"hasError":true,"message":"Failed to serialize response"},"data":{}}"#
                .to_string()
        })
    }
}

/// Deserializes method arguments into a typed options struct
///
/// A missing or non-object argument payload fails with the same message
/// the services use for absent options.
fn parse_options<T: DeserializeOwned>(args: &JsonValue) -> DataResult<T> {
    if !args.is_object() {
        return Err(DataError::invalid_argument("No options provided"));
    }
    serde_json::from_value(args.clone())
        .map_err(|err| DataError::invalid_argument(format!("Invalid options: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher_with(key_target: &str, key_method: &str) -> Dispatcher {
        let config = BridgeConfig::empty().allow(format!("{}.{}", key_target, key_method));
        let mut dispatcher = Dispatcher::new(config);
        dispatcher.register(key_target, key_method, |_ctor, args| {
            Ok(json!({ "echo": args }))
        });
        dispatcher
    }

    #[test]
    fn test_non_whitelisted_invocation_is_refused() {
        let config = BridgeConfig::empty().allow("OtherService.method");
        let dispatcher = Dispatcher::new(config);

        let request = InvokeRequest::new("AllowedService", "getData", json!({}), json!({}));
        let response = dispatcher.dispatch(&request);

        assert!(response.state.has_error);
        assert_eq!(
            response.state.message.as_deref(),
            Some("AllowedService.getData is not whitelisted.")
        );
        assert_eq!(response.data, json!({}));
    }

    #[test]
    fn test_whitelisted_invocation_returns_handler_result() {
        let dispatcher = dispatcher_with("AllowedService", "getData");

        let request =
            InvokeRequest::new("AllowedService", "getData", json!({"n": 1}), json!({}));
        let response = dispatcher.dispatch(&request);

        assert!(!response.state.has_error);
        assert_eq!(response.data, json!({"echo": {"n": 1}}));
    }

    #[test]
    fn test_whitelisted_but_unregistered_key_fails() {
        let config = BridgeConfig::empty().allow("GhostService.haunt");
        let dispatcher = Dispatcher::new(config);

        let request = InvokeRequest::new("GhostService", "haunt", json!({}), json!({}));
        let response = dispatcher.dispatch(&request);

        assert!(response.state.has_error);
        assert_eq!(
            response.state.message.as_deref(),
            Some("GhostService.haunt is not registered.")
        );
    }

    #[test]
    fn test_handler_errors_are_wrapped_into_the_envelope() {
        let config = BridgeConfig::empty().allow("Svc.fail");
        let mut dispatcher = Dispatcher::new(config);
        dispatcher.register("Svc", "fail", |_ctor, _args| {
            Err(DataError::invalid_argument("No options provided"))
        });

        let request = InvokeRequest::new("Svc", "fail", json!({}), json!({}));
        let response = dispatcher.dispatch(&request);

        assert!(response.state.has_error);
        assert_eq!(response.state.message.as_deref(), Some("No options provided"));
        assert_eq!(response.data["code"], json!("invalid_argument"));
    }

    #[test]
    fn test_run_round_trips_json() {
        let dispatcher = dispatcher_with("Svc", "go");

        let raw = r#"{"targetName":"Svc","methodName":"go","methodArgs":{"x":2},"constructorArgs":{}}"#;
        let response: InvokeResponse = serde_json::from_str(&dispatcher.run(raw)).unwrap();

        assert!(!response.state.has_error);
        assert_eq!(response.data, json!({"echo": {"x": 2}}));
    }

    #[test]
    fn test_run_handles_malformed_requests() {
        let dispatcher = dispatcher_with("Svc", "go");

        let response: InvokeResponse =
            serde_json::from_str(&dispatcher.run("this is not json")).unwrap();

        assert!(response.state.has_error);
        assert!(response
            .state
            .message
            .unwrap()
            .starts_with("Malformed invoke request:"));
    }

    #[test]
    fn test_constructor_args_reach_the_handler() {
        let config = BridgeConfig::empty().allow("Svc.ctor");
        let mut dispatcher = Dispatcher::new(config);
        dispatcher.register("Svc", "ctor", |ctor, _args| Ok(json!({ "ctor": ctor })));

        let request = InvokeRequest::new("Svc", "ctor", json!({}), json!({"scope": "x"}));
        let response = dispatcher.dispatch(&request);

        assert_eq!(response.data, json!({"ctor": {"scope": "x"}}));
    }

    #[test]
    fn test_parse_options_rejects_non_objects() {
        let err = parse_options::<QueryOptions>(&JsonValue::Null).unwrap_err();
        assert_eq!(err.to_string(), "No options provided");

        let err = parse_options::<QueryOptions>(&json!("nope")).unwrap_err();
        assert_eq!(err.to_string(), "No options provided");
    }
}
