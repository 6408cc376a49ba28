//! Smoke tests against a running server.
//!
//! These tests require the server running locally, e.g.
//! `FITLIFE_DATABASE_URL=memory:// cargo run -p fitlife-server`.
//!
//! Run with: cargo test -p fitlife-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use fitlife_integration_tests::live_base_url;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_live_root_and_health() {
    let client = Client::new();
    let base_url = live_base_url();

    let root = client.get(format!("{base_url}/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.text().await.unwrap(), "Fit Life Now Server is Running!");

    let ready = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_live_register_and_own_carts() {
    let client = Client::new();
    let base_url = live_base_url();
    let email = format!("live-{}@fitlifenow.test", Uuid::new_v4());

    let registered: Value = client
        .post(format!("{base_url}/users"))
        .json(&json!({ "email": email, "name": "Live Test" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(registered["acknowledged"], json!(true));

    let token: Value = client
        .post(format!("{base_url}/jwt"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = token["token"].as_str().unwrap();

    let carts = client
        .get(format!("{base_url}/carts?email={email}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(carts.status(), StatusCode::OK);
    assert_eq!(carts.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_live_admin_route_without_token() {
    let response = Client::new()
        .get(format!("{}/users?email=a@x.com", live_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
