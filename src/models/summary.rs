//! Summary model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may see a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Shared,
}

impl Visibility {
    /// Map the `is_private` request flag.
    pub fn from_private(is_private: bool) -> Self {
        if is_private {
            Visibility::Private
        } else {
            Visibility::Shared
        }
    }

    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }

    /// Stored string form, used in Firestore filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Shared => "shared",
        }
    }
}

/// Summary stored in Firestore (document ID = `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    /// External ID of the creating user
    pub owner_id: String,
    /// Server (guild) the summary belongs to
    pub server_id: String,
    pub visibility: Visibility,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
