// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration
//!
//! IDs are unique per run so tests can share one emulator.

use chrono::Utc;
use summarizer_api::db::FirestoreDb;
use summarizer_api::models::{Credential, ProfileFields, Summary, Visibility};

mod common;

async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generate a unique user ID for test isolation.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn credential(token: &str) -> Credential {
    Credential {
        access_token: token.to_string(),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(604800),
        refresh_token: None,
        scope: Some("identify".to_string()),
    }
}

fn fields(name: &str) -> ProfileFields {
    ProfileFields {
        display_name: name.to_string(),
        discriminator: "0".to_string(),
    }
}

fn summary(owner_id: &str, server_id: &str, visibility: Visibility, content: &str) -> Summary {
    let now = Utc::now();
    Summary {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        server_id: server_id.to_string(),
        visibility,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_upsert_user_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let external_id = unique_id("user");

    assert!(db.get_user(&external_id).await.unwrap().is_none());

    let first = db
        .upsert_user(&external_id, credential("t1"), fields("nelly"))
        .await
        .unwrap();
    assert!(first.created);

    let second = db
        .upsert_user(&external_id, credential("t2"), fields("nelly2"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.user.internal_id, first.user.internal_id);

    let stored = db.get_user(&external_id).await.unwrap().unwrap();
    assert_eq!(stored.credential.access_token, "t2");
    assert_eq!(stored.display_name, "nelly2");
    assert_eq!(stored.created_at, first.user.created_at);
}

// ═══════════════════════════════════════════════════════════════════════════
// SUMMARY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_summary_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_id("owner");
    let other = unique_id("other");

    let original = summary(&owner, "s1", Visibility::Shared, "hello");
    db.insert_summary(&original).await.unwrap();

    let listed = db.get_summaries_for_owner(&owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, original.id);
    assert!(db.get_summaries_for_owner(&other).await.unwrap().is_empty());

    // Another owner sees nothing to update or delete
    let later = Utc::now() + chrono::Duration::seconds(1);
    assert!(db
        .update_summary_by_scope(&other, "s1", Visibility::Shared, "x", later)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .update_summary_by_id(&other, &original.id, "x", later)
        .await
        .unwrap()
        .is_none());
    assert!(!db.delete_summary(&other, &original.id).await.unwrap());

    let updated = db
        .update_summary_by_scope(&owner, "s1", Visibility::Shared, "bye", later)
        .await
        .unwrap()
        .expect("owner's summary should match");
    assert_eq!(updated.content, "bye");
    assert!(updated.updated_at > updated.created_at);

    assert!(db
        .update_summary_by_scope(&owner, "s1", Visibility::Private, "x", later)
        .await
        .unwrap()
        .is_none());

    assert!(db.delete_summary(&owner, &original.id).await.unwrap());
    assert!(db.get_summaries_for_owner(&owner).await.unwrap().is_empty());
    assert!(!db.delete_summary(&owner, &original.id).await.unwrap());
}
