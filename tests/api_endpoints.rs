//! Integration tests for the LedgerChain HTTP API
//!
//! These tests verify that every endpoint responds with the expected status
//! codes and JSON structures as the chain grows and is tampered with.

use axum_test::TestServer;
use ledgerchain::api::{build_api_router, ApiState};
use ledgerchain::blockchain::{GenesisSecret, Ledger};
use ledgerchain::clock::FixedClock;
use ledgerchain::persistence::{InMemoryPersistence, Persistence};
use serde_json::{json, Value};

fn test_server(store: InMemoryPersistence) -> TestServer {
    let ledger = Ledger::with_clock(
        Box::new(store),
        GenesisSecret::new("api-secret"),
        Box::new(FixedClock("2024-05-01T12:00:00.000Z".to_string())),
    );
    TestServer::new(build_api_router(ApiState::new(ledger))).expect("Failed to create test server")
}

#[tokio::test]
async fn test_append_list_and_integrity() {
    let server = test_server(InMemoryPersistence::new());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["blocks"], 0);

    let response = server.get("/blockchain").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!([]));

    let response = server
        .post("/blockchain")
        .json(&json!({"name": "A", "amount": 10}))
        .await;
    assert_eq!(response.status_code(), 200);
    let first: Value = response.json();
    assert_eq!(first["name"], "A");
    assert_eq!(first["amount"], 10.0);
    assert_eq!(first["timestamp"], "2024-05-01T12:00:00.000Z");
    assert_eq!(
        first["link_hash"],
        GenesisSecret::new("api-secret").link_hash()
    );
    assert!(first["id"].is_string());

    server
        .post("/blockchain")
        .json(&json!({"name": "B", "amount": 20}))
        .await
        .assert_status_ok();

    let response = server.get("/blockchain").await;
    let blocks: Value = response.json();
    assert_eq!(blocks.as_array().unwrap().len(), 2);
    assert_eq!(blocks[0], first);

    let response = server.get("/integrity").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["valid"], true);
    assert_eq!(json["status"], "intact");
    assert_eq!(json["length"], 2);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_find_endpoints() {
    let server = test_server(InMemoryPersistence::new());

    let created: Value = server
        .post("/blockchain")
        .json(&json!({"name": "A", "amount": 5.5}))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let response = server
        .post("/blockchain/find")
        .json(&json!({ "id": id }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), created);

    let response = server.get(&format!("/blockchain/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), created);

    let response = server
        .post("/blockchain/find")
        .json(&json!({"id": "does-not-exist"}))
        .await;
    assert_eq!(response.status_code(), 404);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    let response = server.get("/blockchain/does-not-exist").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_tampered_chain_is_reported_and_lookup_refused() {
    let store = InMemoryPersistence::new();
    let server = test_server(store.clone());

    for (name, amount) in [("A", 1), ("B", 2), ("C", 3)] {
        server
            .post("/blockchain")
            .json(&json!({"name": name, "amount": amount}))
            .await
            .assert_status_ok();
    }

    let mut chain = store.load();
    chain.blocks[0].name = "Z".to_string();
    let first_id = chain.blocks[0].id.clone();
    let last_id = chain.blocks[2].id.clone();
    store.save(&chain).unwrap();

    let response = server.get("/integrity").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["valid"], false);
    assert_eq!(json["status"], "broken");
    assert_eq!(json["index"], 1);

    let response = server.get(&format!("/blockchain/{}", last_id)).await;
    assert_eq!(response.status_code(), 409);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("integrity"));

    // The tampered block's own prefix (just itself) still verifies.
    let response = server.get(&format!("/blockchain/{}", first_id)).await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_invalid_append_bodies() {
    let server = test_server(InMemoryPersistence::new());

    let response = server
        .post("/blockchain")
        .json(&json!({"name": "A"}))
        .expect_failure()
        .await;
    assert!(response.status_code().is_client_error());

    let response = server
        .post("/blockchain")
        .json(&json!({"name": "A", "amount": "ten"}))
        .expect_failure()
        .await;
    assert!(response.status_code().is_client_error());

    let json: Value = server.get("/health").await.json();
    assert_eq!(json["blocks"], 0);
}
