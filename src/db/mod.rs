//! Database layer.
//!
//! The services depend on the [`UserDirectory`] and [`SummaryStore`]
//! contracts only; `main` picks the backend and injects it.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Credential, ProfileFields, Summary, User, Visibility};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Collection names as constants.
pub mod collections {
    /// Keyed by external (Discord) user ID
    pub const USERS: &str = "users";
    /// Keyed by summary ID
    pub const SUMMARIES: &str = "summaries";
}

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Result of a login upsert.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub user: User,
    /// True when this login created the record.
    pub created: bool,
}

/// Persistent mapping from external identity to local user record.
pub trait UserDirectory: Send + Sync {
    fn find_by_external_id<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, Option<User>>;

    /// Create the user if absent, otherwise overwrite credential and profile
    /// fields. The read and write happen as one atomic step per user.
    fn upsert<'a>(
        &'a self,
        external_id: &'a str,
        credential: Credential,
        fields: ProfileFields,
    ) -> StoreFuture<'a, UpsertOutcome>;

    fn exists<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, bool>;
}

/// Persistent summary collection.
///
/// Every mutating operation filters on `owner_id`; a record owned by
/// someone else behaves exactly like a missing one.
pub trait SummaryStore: Send + Sync {
    fn insert(&self, summary: Summary) -> StoreFuture<'_, ()>;

    /// All summaries of `owner_id`, oldest first.
    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<Summary>>;

    /// Overwrite content of the owner's summary for `(server_id, visibility)`.
    /// When several match, the oldest one is updated. `None` if nothing matched.
    fn update_by_scope<'a>(
        &'a self,
        owner_id: &'a str,
        server_id: &'a str,
        visibility: Visibility,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>>;

    /// Overwrite content of the owner's summary `id`. `None` if nothing matched.
    fn update_by_id<'a>(
        &'a self,
        owner_id: &'a str,
        id: &'a str,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>>;

    /// Delete the owner's summary `id`. Returns false if nothing matched.
    fn delete<'a>(&'a self, owner_id: &'a str, id: &'a str) -> StoreFuture<'a, bool>;
}

/// Fresh opaque identifier for users and summaries.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
