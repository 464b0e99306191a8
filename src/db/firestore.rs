// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (login upsert, lookup)
//! - Summaries (owner-scoped CRUD)
//!
//! Read-modify-write operations run inside a Firestore transaction so a
//! concurrent writer to the same document cannot interleave.

use crate::db::{collections, new_id, StoreFuture, SummaryStore, UpsertOutcome, UserDirectory};
use crate::error::AppError;
use crate::models::{Credential, ProfileFields, Summary, User, Visibility};
use chrono::{DateTime, Utc};
use firestore::{FirestoreConsistencySelector, FirestoreTransaction};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Begin a transaction and return a client whose reads join it.
    async fn begin(
        &self,
    ) -> Result<(FirestoreTransaction<'_>, firestore::FirestoreDb), AppError> {
        let client = self.get_client()?;
        let transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        let reader = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        Ok((transaction, reader))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Discord ID.
    pub async fn get_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(external_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or refresh a user at login, preserving `internal_id`.
    pub async fn upsert_user(
        &self,
        external_id: &str,
        credential: Credential,
        fields: ProfileFields,
    ) -> Result<UpsertOutcome, AppError> {
        let (mut transaction, reader) = self.begin().await?;

        let existing: Option<User> = reader
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(external_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read user in transaction: {}", e)))?;

        let now = Utc::now();
        let (user, created) = match existing {
            Some(mut user) => {
                user.refresh_login(credential, fields, now);
                (user, false)
            }
            None => (
                User::new(external_id, new_id(), credential, fields, now),
                true,
            ),
        };

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(external_id)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(UpsertOutcome { user, created })
    }

    // ─── Summary Operations ──────────────────────────────────────

    /// Store a new summary.
    pub async fn insert_summary(&self, summary: &Summary) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SUMMARIES)
            .document_id(&summary.id)
            .object(summary)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all summaries owned by a user, oldest first.
    pub async fn get_summaries_for_owner(&self, owner_id: &str) -> Result<Vec<Summary>, AppError> {
        let mut summaries: Vec<Summary> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUMMARIES)
            .filter(|q| q.for_all([q.field("owner_id").eq(owner_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        summaries.sort_by_key(|s| s.created_at);
        Ok(summaries)
    }

    /// Update the oldest summary matching `(owner, server, visibility)`.
    pub async fn update_summary_by_scope(
        &self,
        owner_id: &str,
        server_id: &str,
        visibility: Visibility,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Summary>, AppError> {
        let (transaction, reader) = self.begin().await?;

        let matches: Vec<Summary> = reader
            .fluent()
            .select()
            .from(collections::SUMMARIES)
            .filter(|q| {
                q.for_all([
                    q.field("owner_id").eq(owner_id),
                    q.field("server_id").eq(server_id),
                    q.field("visibility").eq(visibility.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to query summaries in transaction: {}", e))
            })?;

        let Some(summary) = matches.into_iter().min_by_key(|s| s.created_at) else {
            rollback(transaction).await;
            return Ok(None);
        };

        self.write_content(transaction, summary, content, now)
            .await
            .map(Some)
    }

    /// Update the owner's summary with the given ID.
    pub async fn update_summary_by_id(
        &self,
        owner_id: &str,
        id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Summary>, AppError> {
        let (transaction, reader) = self.begin().await?;

        match Self::read_owned(&reader, owner_id, id).await? {
            Some(summary) => self
                .write_content(transaction, summary, content, now)
                .await
                .map(Some),
            None => {
                rollback(transaction).await;
                Ok(None)
            }
        }
    }

    /// Delete the owner's summary with the given ID.
    pub async fn delete_summary(&self, owner_id: &str, id: &str) -> Result<bool, AppError> {
        let (mut transaction, reader) = self.begin().await?;

        if Self::read_owned(&reader, owner_id, id).await?.is_none() {
            rollback(transaction).await;
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SUMMARIES)
            .document_id(id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Read a summary by ID; a record with another owner reads as absent.
    async fn read_owned(
        reader: &firestore::FirestoreDb,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<Summary>, AppError> {
        let summary: Option<Summary> = reader
            .fluent()
            .select()
            .by_id_in(collections::SUMMARIES)
            .obj()
            .one(id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read summary in transaction: {}", e))
            })?;

        Ok(summary.filter(|s| s.owner_id == owner_id))
    }

    async fn write_content(
        &self,
        mut transaction: FirestoreTransaction<'_>,
        mut summary: Summary,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Summary, AppError> {
        summary.content = content.to_string();
        summary.updated_at = now;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SUMMARIES)
            .document_id(&summary.id)
            .object(&summary)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add summary to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(summary)
    }
}

impl UserDirectory for FirestoreDb {
    fn find_by_external_id<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(self.get_user(external_id))
    }

    fn upsert<'a>(
        &'a self,
        external_id: &'a str,
        credential: Credential,
        fields: ProfileFields,
    ) -> StoreFuture<'a, UpsertOutcome> {
        Box::pin(self.upsert_user(external_id, credential, fields))
    }

    fn exists<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.get_user(external_id).await?.is_some()) })
    }
}

impl SummaryStore for FirestoreDb {
    fn insert(&self, summary: Summary) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.insert_summary(&summary).await })
    }

    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<Summary>> {
        Box::pin(self.get_summaries_for_owner(owner_id))
    }

    fn update_by_scope<'a>(
        &'a self,
        owner_id: &'a str,
        server_id: &'a str,
        visibility: Visibility,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>> {
        Box::pin(self.update_summary_by_scope(owner_id, server_id, visibility, content, now))
    }

    fn update_by_id<'a>(
        &'a self,
        owner_id: &'a str,
        id: &'a str,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>> {
        Box::pin(self.update_summary_by_id(owner_id, id, content, now))
    }

    fn delete<'a>(&'a self, owner_id: &'a str, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(self.delete_summary(owner_id, id))
    }
}

/// Abandon a transaction that matched nothing. A failed rollback only
/// leaves the transaction to expire, so it is logged and not returned.
async fn rollback(transaction: FirestoreTransaction<'_>) {
    if let Err(e) = transaction.rollback().await {
        tracing::warn!(error = %e, "Failed to roll back Firestore transaction");
    }
}
