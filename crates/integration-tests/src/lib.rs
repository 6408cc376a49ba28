//! Test harness for the FitLifeNow API.
//!
//! [`TestApp`] builds the production router over an in-memory store and
//! drives it in-process with `tower::ServiceExt::oneshot`, so the suites in
//! `tests/` need no database or running server. Tests marked
//! `#[ignore = "Requires running server"]` talk to a live server instead:
//!
//! ```bash
//! FITLIFE_DATABASE_URL=memory:// cargo run -p fitlife-server &
//! cargo test -p fitlife-integration-tests -- --ignored
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use fitlife_core::{DeleteResult, DocumentId, InsertOneResult, UpdateResult};
use fitlife_server::config::{SentryConfig, ServerConfig};
use fitlife_server::db::{
    Collection, Document, DocumentStore, Filter, FindOptions, MemoryStore, StoreError,
};
use fitlife_server::routes;
use fitlife_server::services::TokenService;
use fitlife_server::state::AppState;

/// Signing secret shared by the harness and the router under test.
pub const TEST_SECRET: &str = "t3St-k9#Qm2!vR7@xL4$wN8%zB1^hF6&";

/// Memory store that counts every call made against it.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    /// Number of store operations performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.hit();
        self.inner.find(collection, filter, options).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.hit();
        self.inner.find_one(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        self.hit();
        self.inner.insert_one(collection, document).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateResult, StoreError> {
        self.hit();
        self.inner.update_one(collection, filter, set).await
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        self.hit();
        self.inner.delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.hit();
        self.inner.ping().await
    }
}

/// A response as seen by a client.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// The API router wired to a fresh in-memory store.
pub struct TestApp {
    router: Router,
    store: Arc<CountingStore>,
    tokens: TokenService,
}

impl TestApp {
    /// Default configuration: mutating routes are open.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// `FITLIFE_GATE_MUTATIONS=true`.
    pub fn gated() -> Self {
        Self::build(true)
    }

    fn build(gate_mutations: bool) -> Self {
        let config = ServerConfig {
            database_url: SecretString::from("memory://"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            access_token_secret: SecretString::from(TEST_SECRET),
            gate_mutations,
            log_json: false,
            sentry: SentryConfig::default(),
        };
        let tokens = TokenService::new(&config.access_token_secret);
        let store = Arc::new(CountingStore::default());
        let router = routes::app(AppState::new(config, store.clone()));

        Self {
            router,
            store,
            tokens,
        }
    }

    /// Store operations performed so far.
    pub fn store_calls(&self) -> usize {
        self.store.calls()
    }

    /// A valid token for `email`.
    pub fn token_for(&self, email: &str) -> String {
        let mut claims = serde_json::Map::new();
        claims.insert("email".to_owned(), json!(email));
        self.tokens.issue(claims).unwrap()
    }

    /// Send a request; `token` becomes a `Bearer` authorization header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::PATCH, uri, token, None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register `email` through the API and return its id.
    pub async fn register(&self, email: &str) -> DocumentId {
        let response = self.post("/users", None, json!({ "email": email })).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        inserted_id(&response.body)
    }

    /// Register `email` and grant it the admin role. Returns its token.
    ///
    /// Uses the store directly so it also works when mutations are gated.
    pub async fn admin(&self, email: &str) -> String {
        let id = self.register(email).await;
        let mut set = Document::new();
        set.insert("role".to_owned(), json!("admin"));
        self.store
            .update_one(Collection::Users, &Filter::by_id(id), set)
            .await
            .unwrap();
        self.token_for(email)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// The `insertedId` of an insert acknowledgement.
pub fn inserted_id(ack: &Value) -> DocumentId {
    ack["insertedId"].as_str().unwrap().parse().unwrap()
}

/// Base URL of a live server for the ignored tests.
pub fn live_base_url() -> String {
    std::env::var("FITLIFE_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}
