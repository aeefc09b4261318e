//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its understanding status.
//! - Provide the forward-only status ordering used by writes and status updates.
//!
//! # Invariants
//! - `slug` is unique per `user_id`.
//! - `content == None` marks a ghost placeholder created by a forward reference.
//! - Status is only ever promoted: `new < in-progress < understood`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a note row.
pub type NoteId = Uuid;

/// Identity of the owning user. All graph data is scoped by it.
pub type UserId = Uuid;

/// Understanding status tracked per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteStatus {
    /// Placeholder with no written content yet.
    #[serde(rename = "new")]
    New,
    /// Content exists but the topic is still being worked through.
    #[serde(rename = "in-progress", alias = "in_progress")]
    InProgress,
    /// Topic is considered learned.
    #[serde(rename = "understood")]
    Understood,
}

impl NoteStatus {
    /// Storage and wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in-progress",
            Self::Understood => "understood",
        }
    }

    /// Parses the storage spelling. Accepts `in_progress` as an alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "understood" => Some(Self::Understood),
            _ => None,
        }
    }

    /// Returns the higher of the current and requested status.
    pub fn promote(self, requested: Self) -> Self {
        self.max(requested)
    }

    /// Whether moving from `self` to `target` keeps the status monotonic.
    pub fn can_transition_to(self, target: Self) -> bool {
        target >= self
    }

    /// Whether a note holding written content may carry this status.
    /// `New` is reserved for ghosts.
    pub fn allows_content(self) -> bool {
        self != Self::New
    }
}

impl Display for NoteStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub uuid: NoteId,
    pub user_id: UserId,
    /// Display title as first written (or the raw link term for ghosts).
    pub title: String,
    /// Derived from `title` via [`crate::graph::slug::slugify`].
    pub slug: String,
    /// Markdown body. `None` for ghosts.
    pub content: Option<String>,
    pub status: NoteStatus,
    pub is_generated: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Returns whether this note is still a forward-reference placeholder.
    pub fn is_ghost(&self) -> bool {
        self.content.is_none()
    }
}

/// Write payload for the `(user_id, slug)` upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub user_id: UserId,
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub status: NoteStatus,
    pub is_generated: bool,
}

impl NoteDraft {
    /// Draft for content written through the synchronizer.
    pub fn synced(
        user_id: UserId,
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        status: NoteStatus,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            slug: slug.into(),
            content: Some(content.into()),
            status,
            is_generated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStatus;

    #[test]
    fn status_parse_accepts_storage_spelling_and_alias() {
        assert_eq!(NoteStatus::parse("new"), Some(NoteStatus::New));
        assert_eq!(NoteStatus::parse("In-Progress"), Some(NoteStatus::InProgress));
        assert_eq!(NoteStatus::parse("in_progress"), Some(NoteStatus::InProgress));
        assert_eq!(NoteStatus::parse("understood"), Some(NoteStatus::Understood));
        assert_eq!(NoteStatus::parse("done"), None);
    }

    #[test]
    fn promote_never_demotes() {
        assert_eq!(
            NoteStatus::New.promote(NoteStatus::InProgress),
            NoteStatus::InProgress
        );
        assert_eq!(
            NoteStatus::Understood.promote(NoteStatus::InProgress),
            NoteStatus::Understood
        );
        assert_eq!(NoteStatus::InProgress.promote(NoteStatus::New), NoteStatus::InProgress);
    }

    #[test]
    fn transitions_are_forward_only() {
        assert!(NoteStatus::New.can_transition_to(NoteStatus::Understood));
        assert!(NoteStatus::InProgress.can_transition_to(NoteStatus::InProgress));
        assert!(!NoteStatus::Understood.can_transition_to(NoteStatus::New));
    }

    #[test]
    fn new_is_reserved_for_ghosts() {
        assert!(!NoteStatus::New.allows_content());
        assert!(NoteStatus::InProgress.allows_content());
        assert!(NoteStatus::Understood.allows_content());
    }

    #[test]
    fn serde_uses_hyphenated_spelling() {
        let json = serde_json::to_string(&NoteStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: NoteStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, NoteStatus::InProgress);
    }
}
