//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record stored in Firestore (document ID = `external_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Discord user ID
    pub external_id: String,
    /// Locally generated ID, assigned at first login and never changed
    pub internal_id: String,
    /// Token bundle from the last successful login
    pub credential: Credential,
    pub display_name: String,
    pub discriminator: String,
    /// When the user first logged in
    pub created_at: DateTime<Utc>,
    /// Last successful login
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a first-login record.
    pub fn new(
        external_id: &str,
        internal_id: String,
        credential: Credential,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            external_id: external_id.to_string(),
            internal_id,
            credential,
            display_name: fields.display_name,
            discriminator: fields.discriminator,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the login-scoped fields. `internal_id` and `created_at` are kept.
    pub fn refresh_login(
        &mut self,
        credential: Credential,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) {
        self.credential = credential;
        self.display_name = fields.display_name;
        self.discriminator = fields.discriminator;
        self.updated_at = now;
    }
}

/// Token bundle returned by the provider's token endpoint.
///
/// Stored as received; only `access_token` is required.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds, as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .finish()
    }
}

/// Provider-supplied fields copied onto the user at every login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub display_name: String,
    pub discriminator: String,
}

/// Validated profile of the token holder.
///
/// Fields the provider sends beyond the named ones are kept in `extra`
/// so the full payload can be handed back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "id")]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Profile {
    /// Fields written to the user record. Absent values become empty strings.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            display_name: self.username.clone().unwrap_or_default(),
            discriminator: self.discriminator.clone().unwrap_or_default(),
        }
    }
}
