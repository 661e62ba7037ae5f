//! Link entity representing an owned short code → long URL mapping.

use serde::{Deserialize, Serialize};

/// A shortened URL owned by a single user.
///
/// The serialized field names double as the journal line format of
/// [`crate::infrastructure::persistence::MemoryLinkStore`], so renaming them
/// breaks replay of existing journals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(rename = "short_url")]
    pub code: String,
    #[serde(rename = "original_url")]
    pub long_url: String,
    #[serde(rename = "is_deleted", default)]
    pub deleted: bool,
}

impl Link {
    /// Creates a new, active link.
    pub fn new(
        owner_id: impl Into<String>,
        code: impl Into<String>,
        long_url: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            code: code.into(),
            long_url: long_url.into(),
            deleted: false,
        }
    }

    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns true if `owner_id` created this link.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Result of a create attempt.
///
/// `Conflict` is not an error: the owner already shortened this exact URL and
/// the existing record is handed back instead of a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Conflict,
}

impl CreateOutcome {
    pub fn is_conflict(self) -> bool {
        matches!(self, CreateOutcome::Conflict)
    }
}

/// Result of resolving a short code for a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The code exists and is active.
    Found(Link),
    /// No record has ever been stored under the code.
    NotFound,
    /// The code exists but its owner deleted it.
    Gone,
}
