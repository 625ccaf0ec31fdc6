//! Client-to-dispatcher round trips over the loopback transport.

use std::sync::Arc;

use serde_json::json;

use tablekit_client::{BridgeClient, ClientError, LoopbackTransport};
use tablekit_core::{
    BridgeConfig, DeleteOptions, Dispatcher, InsertOptions, LookupOptions, ProjectedField,
    QueryOptions,
};
use tablekit_memstore::{MemoryStore, RecordSeed};

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for (id, number, state) in [("t1", "TASK0001", 2), ("t2", "TASK0002", 1)] {
        store.seed(
            "task",
            id,
            RecordSeed::new().field("number", number).field("state", state),
        );
    }
    Arc::new(store)
}

fn client_over(store: Arc<MemoryStore>, config: BridgeConfig) -> BridgeClient<LoopbackTransport> {
    let dispatcher = Dispatcher::with_standard_services(store, config);
    BridgeClient::new(LoopbackTransport::new(dispatcher))
}

#[tokio::test]
async fn query_round_trip_returns_projected_records() {
    let client = client_over(seeded_store(), BridgeConfig::new());
    let options = QueryOptions::new("task").fields(["number"]).max(1);

    let rows = client.get_record_list(&options).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["number"], ProjectedField::Scalar(json!("TASK0001")));
}

#[tokio::test]
async fn lookup_round_trip_resolves_and_misses() {
    let client = client_over(seeded_store(), BridgeConfig::new());

    let options = LookupOptions::new("task").fields(["number"]).identifier("t2");
    let record = client.get_record(&options).await.unwrap().unwrap();
    assert_eq!(record["number"], ProjectedField::Scalar(json!("TASK0002")));

    let options = LookupOptions::new("task")
        .fields(["number"])
        .identifier("missing");
    assert!(client.get_record(&options).await.unwrap().is_none());
}

#[tokio::test]
async fn default_whitelist_rejects_mutations() {
    let client = client_over(seeded_store(), BridgeConfig::new());
    let options = InsertOptions::new("task").value("number", "TASK0099");

    let err = client.insert_record(&options).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { .. }));
    assert_eq!(
        err.to_string(),
        "RecordMutationService.insertRecord is not whitelisted."
    );
}

#[tokio::test]
async fn widened_whitelist_allows_the_full_cycle() {
    let store = seeded_store();
    let client = client_over(
        Arc::clone(&store),
        BridgeConfig::new().allow_all_record_services(),
    );

    let id = client
        .insert_record(&InsertOptions::new("task").value("number", "TASK0099"))
        .await
        .unwrap()
        .unwrap();
    assert!(!id.is_empty());
    assert_eq!(store.len("task"), 3);

    let deleted = client
        .delete_records(&DeleteOptions::new("task", "number=TASK0099"))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(store.len("task"), 2);
}

#[tokio::test]
async fn validation_failures_carry_the_service_message() {
    let client = client_over(seeded_store(), BridgeConfig::new());
    let options = QueryOptions {
        collection: None,
        ..QueryOptions::default()
    };

    let err = client.get_record_list(&options).await.unwrap_err();
    assert_eq!(err.to_string(), "No table provided or table is not a string");
}
