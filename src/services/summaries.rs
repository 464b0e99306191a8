// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership-checked summary operations.
//!
//! `owner_id` always comes from the resolved bearer identity and is part
//! of every store filter, so a caller only ever touches its own records.

use crate::db::{new_id, SummaryStore, UserDirectory};
use crate::error::AppError;
use crate::models::{Summary, Visibility};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct SummaryService {
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn SummaryStore>,
}

impl SummaryService {
    pub fn new(users: Arc<dyn UserDirectory>, store: Arc<dyn SummaryStore>) -> Self {
        Self { users, store }
    }

    /// Create a summary for an existing user and return its ID.
    pub async fn create(
        &self,
        owner_id: &str,
        server_id: &str,
        visibility: Visibility,
        content: &str,
    ) -> Result<String, AppError> {
        if !self.users.exists(owner_id).await? {
            tracing::warn!(owner_id, "Summary create for unknown user");
            return Err(AppError::Unauthorized);
        }

        let now = Utc::now();
        let summary = Summary {
            id: new_id(),
            owner_id: owner_id.to_string(),
            server_id: server_id.to_string(),
            visibility,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = summary.id.clone();

        self.store.insert(summary).await?;
        tracing::info!(owner_id, summary_id = %id, server_id, "Summary created");
        Ok(id)
    }

    /// All summaries owned by `owner_id`; empty when there are none.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Summary>, AppError> {
        self.store.list_by_owner(owner_id).await
    }

    /// Overwrite the content of the owner's summary for `(server_id, visibility)`.
    pub async fn update(
        &self,
        owner_id: &str,
        server_id: &str,
        visibility: Visibility,
        content: &str,
    ) -> Result<Summary, AppError> {
        self.store
            .update_by_scope(owner_id, server_id, visibility, content, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No {} summary for server {}",
                    visibility.as_str(),
                    server_id
                ))
            })
    }

    /// Overwrite the content of the owner's summary `summary_id`.
    pub async fn update_by_id(
        &self,
        owner_id: &str,
        summary_id: &str,
        content: &str,
    ) -> Result<Summary, AppError> {
        self.store
            .update_by_id(owner_id, summary_id, content, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Summary {}", summary_id)))
    }

    /// Delete the owner's summary `summary_id`.
    pub async fn delete(&self, owner_id: &str, summary_id: &str) -> Result<(), AppError> {
        if !self.store.delete(owner_id, summary_id).await? {
            return Err(AppError::NotFound(format!("Summary {}", summary_id)));
        }
        tracing::info!(owner_id, summary_id, "Summary deleted");
        Ok(())
    }
}
