// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Summary, Visibility};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Summary routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-summary", post(create_summary))
        .route("/summarizer", get(list_summaries))
        .route("/update-summary", put(update_summary))
        .route("/delete-summary", delete(delete_summary))
}

/// Unwrap and validate a JSON body, answering 400 on any problem.
fn parse_body<T: Validate>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    let Json(body) =
        payload.map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {}", e)))?;
    body.validate()
        .map_err(|e| AppError::InvalidRequest(format!("Missing required fields: {}", e)))?;
    Ok(body)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateSummaryRequest {
    #[validate(length(min = 1))]
    server_id: String,
    #[serde(default)]
    is_private: bool,
    #[validate(length(min = 1))]
    content: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateSummaryResponse {
    pub message: String,
    pub summary_id: String,
}

async fn create_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<CreateSummaryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSummaryResponse>)> {
    let body = parse_body(payload)?;

    let summary_id = state
        .summaries
        .create(
            &user.external_id,
            &body.server_id,
            Visibility::from_private(body.is_private),
            &body.content,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSummaryResponse {
            message: "Summary created successfully".to_string(),
            summary_id,
        }),
    ))
}

// ─── List ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryResponse {
    pub summary_id: String,
    pub user_id: String,
    pub server_id: String,
    pub is_private: bool,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            summary_id: summary.id,
            user_id: summary.owner_id,
            server_id: summary.server_id,
            is_private: summary.visibility.is_private(),
            content: summary.content,
            created_at: summary
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: summary
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

async fn list_summaries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<SummaryResponse>>> {
    let summaries = state.summaries.list(&user.external_id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

// ─── Update ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct UpdateSummaryRequest {
    /// When set, the summary is addressed by ID instead of server + visibility.
    #[serde(default)]
    summary_id: Option<String>,
    #[validate(length(min = 1))]
    server_id: String,
    #[serde(default)]
    is_private: bool,
    #[validate(length(min = 1))]
    content: String,
}

async fn update_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<UpdateSummaryRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let body = parse_body(payload)?;

    match body.summary_id.as_deref().filter(|id| !id.is_empty()) {
        Some(summary_id) => {
            state
                .summaries
                .update_by_id(&user.external_id, summary_id, &body.content)
                .await?
        }
        None => {
            state
                .summaries
                .update(
                    &user.external_id,
                    &body.server_id,
                    Visibility::from_private(body.is_private),
                    &body.content,
                )
                .await?
        }
    };

    Ok(Json(MessageResponse {
        message: "Summary updated successfully".to_string(),
    }))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct DeleteSummaryRequest {
    #[validate(length(min = 1))]
    summary_id: String,
}

async fn delete_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<DeleteSummaryRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let body = parse_body(payload)?;

    state
        .summaries
        .delete(&user.external_id, &body.summary_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Summary deleted successfully".to_string(),
    }))
}
