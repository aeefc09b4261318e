//! Edge domain model.
//!
//! # Invariants
//! - The set of edges for one source mirrors the source's current `[[term]]` list.
//! - `EdgeId` grows monotonically, so ordering by id reproduces insertion order.

use crate::model::note::{NoteId, UserId};
use serde::{Deserialize, Serialize};

/// Auto-generated edge identifier.
pub type EdgeId = i64;

/// Kind of relationship an edge records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Produced by a `[[term]]` reference.
    RelatedTo,
}

impl RelationshipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RelatedTo => "related_to",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "related_to" => Some(Self::RelatedTo),
            _ => None,
        }
    }
}

/// Persisted directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub user_id: UserId,
    pub source_id: NoteId,
    pub target_id: NoteId,
    pub relationship: RelationshipKind,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Insert payload for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEdge {
    pub user_id: UserId,
    pub source_id: NoteId,
    pub target_id: NoteId,
    pub relationship: RelationshipKind,
}

impl NewEdge {
    /// Edge produced by a `[[term]]` link.
    pub fn related(user_id: UserId, source_id: NoteId, target_id: NoteId) -> Self {
        Self {
            user_id,
            source_id,
            target_id,
            relationship: RelationshipKind::RelatedTo,
        }
    }
}
