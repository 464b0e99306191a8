// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth authentication routes.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Profile;
use crate::AppState;

/// Public login routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

/// Routes that need a bearer token. The auth middleware is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(profile))
        .route("/is_authenticated", get(is_authenticated))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub url: String,
}

/// Return the Discord authorization URL for the client to open.
async fn login(State(state): State<Arc<AppState>>) -> Json<LoginResponse> {
    tracing::info!(
        client_id = %state.config.discord_client_id,
        "Starting OAuth flow"
    );
    Json(LoginResponse {
        url: state.oauth.login_url(),
    })
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    /// Set by Discord when the user denies consent
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CallbackResponse {
    pub message: String,
    pub user_id: String,
    /// Token the client presents as `Authorization: Bearer` afterwards
    pub access_token: String,
    pub token_type: Option<String>,
}

/// OAuth callback - exchange code for tokens and record the user.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<CallbackResponse>> {
    let has_code = params.code.as_deref().is_some_and(|c| !c.is_empty());
    if let (false, Some(error)) = (has_code, params.error.as_deref()) {
        tracing::warn!(error = %error, "OAuth error from Discord");
        return Err(AppError::InvalidRequest(format!(
            "Authorization failed: {}",
            error
        )));
    }

    let result = state.oauth.handle_callback(params.code.as_deref()).await?;

    Ok(Json(CallbackResponse {
        message: "Successfully Authenticated".to_string(),
        user_id: result.user.external_id,
        access_token: result.credential.access_token,
        token_type: result.credential.token_type,
    }))
}

/// Profile of the token holder, as returned by Discord.
async fn profile(Extension(user): Extension<AuthUser>) -> Json<Profile> {
    Json(user.profile)
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub message: String,
    pub user_id: String,
    pub user_info: Profile,
}

async fn is_authenticated(Extension(user): Extension<AuthUser>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        message: "Authenticated".to_string(),
        user_id: user.external_id,
        user_info: user.profile,
    })
}
