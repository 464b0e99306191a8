// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer authentication tests for protected endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, create_test_app, mock_profile, request, PROFILE_PATH};
use httpmock::prelude::*;
use summarizer_api::error::AppError;
use tower::ServiceExt;

const USER_ID: &str = "80351110224678912";

#[tokio::test]
async fn test_resolve_accepts_valid_token() {
    let app = create_test_app().await;
    let profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    let identity = app
        .state
        .identity
        .resolve(Some("Bearer abc123"))
        .await
        .unwrap();
    assert_eq!(identity.external_id, USER_ID);
    assert_eq!(identity.profile.username.as_deref(), Some("nelly"));
    assert_eq!(identity.profile.extra["locale"], "en-US");

    profile.assert_async().await;
}

#[tokio::test]
async fn test_resolve_rejects_malformed_headers_without_calling_provider() {
    let app = create_test_app().await;
    let profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    for header in [None, Some(""), Some("Token abc123"), Some("Bearer "), Some("bearer abc123")] {
        let result = app.state.identity.resolve(header).await;
        assert!(
            matches!(result, Err(AppError::Unauthorized)),
            "{:?} should be rejected",
            header
        );
    }

    profile.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_resolve_rejects_revoked_token() {
    let app = create_test_app().await;
    let _profile = app
        .provider
        .mock_async(|when, then| {
            when.method(GET).path(PROFILE_PATH);
            then.status(401)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "message": "401: Unauthorized", "code": 0 }));
        })
        .await;

    let result = app.state.identity.resolve(Some("Bearer revoked")).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_resolve_does_not_cache() {
    let app = create_test_app().await;
    let profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    for _ in 0..2 {
        app.state
            .identity
            .resolve(Some("Bearer abc123"))
            .await
            .unwrap();
    }

    profile.assert_calls_async(2).await;
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = create_test_app().await;

    for (method, uri) in [
        ("GET", "/profile"),
        ("GET", "/is_authenticated"),
        ("GET", "/summarizer"),
        ("POST", "/create-summary"),
        ("PUT", "/update-summary"),
        ("DELETE", "/delete-summary"),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(request(method, uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_is_authenticated_with_valid_token() {
    let app = create_test_app().await;
    let _profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    let response = app
        .router
        .oneshot(request("GET", "/is_authenticated", Some("abc123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Authenticated");
    assert_eq!(json["user_id"], USER_ID);
    assert_eq!(json["user_info"]["username"], "nelly");
}

#[tokio::test]
async fn test_profile_returns_provider_payload() {
    let app = create_test_app().await;
    let _profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    let response = app
        .router
        .oneshot(request("GET", "/profile", Some("abc123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], USER_ID);
    assert_eq!(json["global_name"], "nelly");
    assert_eq!(json["locale"], "en-US");
}

#[tokio::test]
async fn test_matching_id_header_is_accepted() {
    let app = create_test_app().await;
    let _profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    let request = Request::builder()
        .method("GET")
        .uri("/is_authenticated")
        .header(header::AUTHORIZATION, "Bearer abc123")
        .header("ID", USER_ID)
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_mismatched_id_header_is_rejected() {
    let app = create_test_app().await;
    let _profile = mock_profile(&app.provider, "abc123", USER_ID, "nelly").await;

    let request = Request::builder()
        .method("GET")
        .uri("/summarizer")
        .header(header::AUTHORIZATION, "Bearer abc123")
        .header("ID", "someone-else")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend() {
    let app = create_test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/summarizer")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,id")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}
