// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::error::AppError;
use crate::models::Profile;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header older clients send with their own user ID.
pub const LEGACY_ID_HEADER: &str = "id";

/// Authenticated user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub external_id: String,
    pub profile: Profile,
}

/// Middleware that requires a bearer token Discord still accepts.
///
/// The legacy `ID` header is never trusted for identity; when present it
/// must name the same user as the token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let identity = state.identity.resolve(authorization.as_deref()).await?;

    if let Some(claimed) = request.headers().get(LEGACY_ID_HEADER) {
        if claimed.as_bytes() != identity.external_id.as_bytes() {
            tracing::warn!(
                external_id = %identity.external_id,
                "ID header does not match bearer identity"
            );
            return Err(AppError::Unauthorized);
        }
    }

    request.extensions_mut().insert(AuthUser {
        external_id: identity.external_id,
        profile: identity.profile,
    });

    Ok(next.run(request).await)
}
