// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use httpmock::prelude::*;
use httpmock::Mock;
use std::sync::Arc;
use summarizer_api::config::Config;
use summarizer_api::db::{FirestoreDb, MemoryStore, UserDirectory};
use summarizer_api::models::{Credential, ProfileFields};
use summarizer_api::routes::create_router;
use summarizer_api::AppState;

#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/api/oauth2/token";
#[allow(dead_code)]
pub const PROFILE_PATH: &str = "/api/users/@me";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Config whose Discord endpoints point at the mock provider.
#[allow(dead_code)]
pub fn test_config(provider: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.discord_endpoints.authorize_url = provider.url("/oauth2/authorize");
    config.discord_endpoints.token_url = provider.url(TOKEN_PATH);
    config.discord_endpoints.profile_url = provider.url(PROFILE_PATH);
    config
}

/// App wired to an in-memory store and a mock Discord.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub provider: MockServer,
}

#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    let provider = MockServer::start_async().await;
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        test_config(&provider),
        store.clone(),
        store.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        provider,
    }
}

/// App whose store is offline: every database call fails.
#[allow(dead_code)]
pub async fn create_offline_test_app() -> (axum::Router, MockServer) {
    let provider = MockServer::start_async().await;
    let db = Arc::new(FirestoreDb::new_mock());
    let state = Arc::new(AppState::new(test_config(&provider), db.clone(), db));
    (create_router(state), provider)
}

/// Discord answers the token endpoint with `access_token`.
#[allow(dead_code)]
pub async fn mock_token<'a>(provider: &'a MockServer, access_token: &str) -> Mock<'a> {
    let body = serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 604800,
        "refresh_token": format!("refresh-{}", access_token),
        "scope": "identify"
    });
    provider
        .mock_async(|when, then| {
            when.method(POST)
                .path(TOKEN_PATH)
                .header("content-type", "application/x-www-form-urlencoded");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Discord accepts `access_token` and reports the given user.
#[allow(dead_code)]
pub async fn mock_profile<'a>(
    provider: &'a MockServer,
    access_token: &str,
    user_id: &str,
    username: &str,
) -> Mock<'a> {
    let body = serde_json::json!({
        "id": user_id,
        "username": username,
        "discriminator": "0",
        "global_name": username,
        "avatar": null,
        "locale": "en-US"
    });
    let authorization = format!("Bearer {}", access_token);
    provider
        .mock_async(|when, then| {
            when.method(GET)
                .path(PROFILE_PATH)
                .header("authorization", authorization);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Insert a user directly, as if they had logged in before.
#[allow(dead_code)]
pub async fn seed_user(store: &MemoryStore, external_id: &str) {
    let credential = Credential {
        access_token: format!("seed-{}", external_id),
        token_type: Some("Bearer".to_string()),
        expires_in: None,
        refresh_token: None,
        scope: None,
    };
    store
        .upsert(external_id, credential, ProfileFields::default())
        .await
        .expect("seeding a user in memory cannot fail");
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
