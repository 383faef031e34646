//! Common test utilities for integration tests.
//!
//! Tests drive the full router against the in-memory store and a fake
//! identity provider, so no database or network is needed.

// Helpers are shared across test binaries; not every binary uses all of them.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use bathroom_api::{
    app::{create_app, AppState},
    config::{
        Config, DatabaseConfig, LoggingConfig, OAuthConfig, SecurityConfig, ServerConfig,
        SessionConfig, StorageBackend, StorageConfig,
    },
};
use domain::models::{Bathroom, BathroomQuery, Identity, NewBathroom, Review, Tags};
use domain::ports::{
    BathroomStore, IdentityError, IdentityProvider, ReviewMutation, ReviewMutationOutcome,
    StoreError, UpsertOutcome,
};
use domain::services::upsert_review;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::InMemoryStore;

pub const TEST_SESSION_SECRET: &str = "integration-test-session-secret";

/// Token the fake identity provider treats as an outage.
pub const UNAVAILABLE_ID_TOKEN: &str = "provider-down";

/// Test configuration backed by the in-memory store.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            hsts_enabled: false,
        },
        session: SessionConfig {
            secret: TEST_SESSION_SECRET.to_string(),
            expiry_secs: 3600,
            leeway_secs: 0,
            cookie_name: "session".to_string(),
            cookie_secure: false,
        },
        oauth: OAuthConfig {
            google_client_id: "test-client-id".to_string(),
        },
    }
}

/// Identity provider that accepts a fixed set of ID tokens.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    accepted: HashMap<String, Identity>,
}

impl FakeIdentityProvider {
    pub fn with_token(mut self, id_token: &str, identity: Identity) -> Self {
        self.accepted.insert(id_token.to_string(), identity);
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError> {
        if id_token == UNAVAILABLE_ID_TOKEN {
            return Err(IdentityError::Unavailable("tokeninfo timed out".to_string()));
        }
        self.accepted
            .get(id_token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected("unknown token".to_string()))
    }
}

/// Store whose every call fails as if the database were unreachable.
#[derive(Debug, Default)]
pub struct UnreachableStore;

fn unreachable<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl BathroomStore for UnreachableStore {
    async fn upsert_by_osm_id(&self, _: NewBathroom) -> Result<UpsertOutcome, StoreError> {
        unreachable()
    }

    async fn find_by_osm_id(&self, _: i64) -> Result<Option<Bathroom>, StoreError> {
        unreachable()
    }

    async fn find_many(&self, _: &BathroomQuery) -> Result<Vec<Bathroom>, StoreError> {
        unreachable()
    }

    async fn apply_review_mutation(
        &self,
        _: i64,
        _: ReviewMutation,
    ) -> Result<Option<ReviewMutationOutcome>, StoreError> {
        unreachable()
    }

    async fn push_image(&self, _: i64, _: String) -> Result<Option<Bathroom>, StoreError> {
        unreachable()
    }

    async fn find_reviews_by_author(&self, _: &str) -> Result<Vec<Bathroom>, StoreError> {
        unreachable()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        unreachable()
    }
}

/// Router plus handles for inspecting state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_bathrooms(Vec::new())
    }

    pub fn with_bathrooms(bathrooms: Vec<Bathroom>) -> Self {
        Self::build(
            InMemoryStore::with_bathrooms(bathrooms),
            FakeIdentityProvider::default(),
        )
    }

    pub fn with_identity(identity: FakeIdentityProvider) -> Self {
        Self::build(InMemoryStore::new(), identity)
    }

    fn build(store: InMemoryStore, identity: FakeIdentityProvider) -> Self {
        let store = Arc::new(store);
        let state = AppState::new(test_config(), store.clone(), store.clone(), Arc::new(identity))
            .expect("test session secret is valid");
        Self {
            router: create_app(state.clone()),
            state,
            store,
        }
    }

    /// Session token for a user, as issued after a successful login.
    pub fn session_for(&self, user: &TestUser) -> String {
        let (token, _) = self
            .state
            .sessions
            .issue(&user.email, Some(&user.name), None)
            .expect("token issue");
        token
    }

    pub async fn bathroom(&self, osm_id: i64) -> Option<Bathroom> {
        self.store.find_by_osm_id(osm_id).await.unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Generated test user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub name: String,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            email: SafeEmail().fake(),
            name: Name().fake(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            name: Some(self.name.clone()),
            picture: None,
        }
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn tags(name: &str) -> Tags {
    Tags::from([("name".to_string(), name.to_string())])
}

/// Bathroom with no reviews.
pub fn bathroom(osm_id: i64, lat: f64, lon: f64, name: &str) -> Bathroom {
    Bathroom::new(osm_id, lat, lon, tags(name))
}

/// Bathroom carrying one review per rating, each from a distinct author.
pub fn rated_bathroom(osm_id: i64, lat: f64, lon: f64, name: &str, ratings: &[f64]) -> Bathroom {
    let mut bathroom = bathroom(osm_id, lat, lon, name);
    for (i, rating) in ratings.iter().enumerate() {
        let email = format!("seed{}@example.com", i);
        let review = Review {
            user_email: email.clone(),
            user_name: format!("Seed {}", i),
            rating: *rating,
            comment: String::new(),
            created_at: "2024-10-19T12:00:00.000Z".to_string(),
        };
        upsert_review(&bathroom.reviews, &email, review).write_to(&mut bathroom);
    }
    bathroom
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    empty_request(Method::GET, uri, None)
}

pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
