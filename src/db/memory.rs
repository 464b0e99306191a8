//! Thread-safe in-memory store for local development and tests.

use crate::db::{new_id, StoreFuture, SummaryStore, UpsertOutcome, UserDirectory};
use crate::models::{Credential, ProfileFields, Summary, User, Visibility};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type UserMap = Arc<RwLock<HashMap<String, User>>>;
type SummaryMap = Arc<RwLock<HashMap<String, Summary>>>;

/// Keeps users and summaries in-process. Each operation holds the
/// collection lock for its whole read-modify-write.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: UserMap,
    summaries: SummaryMap,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Number of stored summaries across all owners.
    pub fn summary_count(&self) -> usize {
        self.summaries.read().len()
    }

    fn upsert_now(
        &self,
        external_id: &str,
        credential: Credential,
        fields: ProfileFields,
    ) -> UpsertOutcome {
        let now = Utc::now();
        let mut guard = self.users.write();

        match guard.get_mut(external_id) {
            Some(user) => {
                user.refresh_login(credential, fields, now);
                UpsertOutcome {
                    user: user.clone(),
                    created: false,
                }
            }
            None => {
                let user = User::new(external_id, new_id(), credential, fields, now);
                guard.insert(external_id.to_string(), user.clone());
                UpsertOutcome {
                    user,
                    created: true,
                }
            }
        }
    }

    fn list_now(&self, owner_id: &str) -> Vec<Summary> {
        let mut owned: Vec<Summary> = self
            .summaries
            .read()
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|s| s.created_at);
        owned
    }

    fn update_where<F>(&self, matches: F, content: &str, now: DateTime<Utc>) -> Option<Summary>
    where
        F: Fn(&Summary) -> bool,
    {
        let mut guard = self.summaries.write();
        let target = guard
            .values_mut()
            .filter(|s| matches(&**s))
            .min_by_key(|s| s.created_at)?;

        target.content = content.to_string();
        target.updated_at = now;
        Some(target.clone())
    }

    fn delete_now(&self, owner_id: &str, id: &str) -> bool {
        let mut guard = self.summaries.write();
        let owned = guard.get(id).is_some_and(|s| s.owner_id == owner_id);
        owned && guard.remove(id).is_some()
    }
}

impl UserDirectory for MemoryStore {
    fn find_by_external_id<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move { Ok(self.users.read().get(external_id).cloned()) })
    }

    fn upsert<'a>(
        &'a self,
        external_id: &'a str,
        credential: Credential,
        fields: ProfileFields,
    ) -> StoreFuture<'a, UpsertOutcome> {
        Box::pin(async move { Ok(self.upsert_now(external_id, credential, fields)) })
    }

    fn exists<'a>(&'a self, external_id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.users.read().contains_key(external_id)) })
    }
}

impl SummaryStore for MemoryStore {
    fn insert(&self, summary: Summary) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.summaries.write().insert(summary.id.clone(), summary);
            Ok(())
        })
    }

    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<Summary>> {
        Box::pin(async move { Ok(self.list_now(owner_id)) })
    }

    fn update_by_scope<'a>(
        &'a self,
        owner_id: &'a str,
        server_id: &'a str,
        visibility: Visibility,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>> {
        Box::pin(async move {
            Ok(self.update_where(
                |s| s.owner_id == owner_id && s.server_id == server_id && s.visibility == visibility,
                content,
                now,
            ))
        })
    }

    fn update_by_id<'a>(
        &'a self,
        owner_id: &'a str,
        id: &'a str,
        content: &'a str,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Summary>> {
        Box::pin(async move {
            Ok(self.update_where(|s| s.owner_id == owner_id && s.id == id, content, now))
        })
    }

    fn delete<'a>(&'a self, owner_id: &'a str, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.delete_now(owner_id, id)) })
    }
}
