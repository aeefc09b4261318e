//! Read-side graph queries for visualization and study recommendations.
//!
//! # Invariants
//! - Output ordering is deterministic (slug/title/id based), never storage order.
//! - Results never include another user's notes or edges.

use crate::model::edge::RelationshipKind;
use crate::model::note::{Note, NoteId, NoteStatus, UserId};
use crate::repo::note_repo::NoteListQuery;
use crate::repo::store::{GraphStore, RepoError, RepoResult};
use crate::service::note_service::note_key;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LIST_PAGE_SIZE: u32 = 200;

#[derive(Debug)]
pub enum GraphServiceError {
    NoteNotFound(String),
    Repo(RepoError),
}

impl Display for GraphServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(slug) => write!(f, "note not found: `{slug}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<RepoError> for GraphServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Node payload for graph rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: NoteId,
    pub title: String,
    pub slug: String,
    pub status: NoteStatus,
    pub is_ghost: bool,
}

/// Link payload for graph rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: NoteId,
    pub target: NoteId,
    pub relationship: RelationshipKind,
}

/// Whole-graph snapshot for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphView {
    /// Sorted by slug.
    pub nodes: Vec<GraphNode>,
    /// Sorted by edge id.
    pub links: Vec<GraphLink>,
}

/// Unwritten note worth studying next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub note: Note,
    /// Number of edges pointing at the note.
    pub reference_count: usize,
}

/// Graph read facade over a graph store.
pub struct GraphService<S: GraphStore> {
    store: S,
}

impl<S: GraphStore> GraphService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds the node/link snapshot used by the graph view.
    pub fn graph_view(&self, user_id: UserId) -> Result<GraphView, GraphServiceError> {
        let mut nodes = self
            .all_notes(user_id)?
            .into_iter()
            .map(|note| GraphNode {
                id: note.uuid,
                is_ghost: note.is_ghost(),
                title: note.title,
                slug: note.slug,
                status: note.status,
            })
            .collect::<Vec<_>>();
        nodes.sort_by(|left, right| left.slug.cmp(&right.slug));

        let links = self
            .store
            .list_edges(user_id)?
            .into_iter()
            .map(|edge| GraphLink {
                source: edge.source_id,
                target: edge.target_id,
                relationship: edge.relationship,
            })
            .collect();

        Ok(GraphView { nodes, links })
    }

    /// Distinct notes linked from the given note, in first-link order.
    pub fn outgoing(
        &self,
        user_id: UserId,
        title_or_slug: &str,
    ) -> Result<Vec<Note>, GraphServiceError> {
        let source = self.require_note(user_id, title_or_slug)?;
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for edge in self.store.list_outgoing(user_id, source.uuid)? {
            if !seen.insert(edge.target_id) {
                continue;
            }
            if let Some(note) = self.store.get_note(user_id, edge.target_id)? {
                targets.push(note);
            }
        }
        Ok(targets)
    }

    /// Distinct notes linking to the given note, ordered by title then slug.
    pub fn backlinks(
        &self,
        user_id: UserId,
        title_or_slug: &str,
    ) -> Result<Vec<Note>, GraphServiceError> {
        let target = self.require_note(user_id, title_or_slug)?;
        let mut seen = HashSet::new();
        let mut sources = Vec::new();
        for edge in self.store.list_incoming(user_id, target.uuid)? {
            if !seen.insert(edge.source_id) {
                continue;
            }
            if let Some(note) = self.store.get_note(user_id, edge.source_id)? {
                sources.push(note);
            }
        }
        sources.sort_by(|left, right| {
            left.title
                .cmp(&right.title)
                .then_with(|| left.slug.cmp(&right.slug))
        });
        Ok(sources)
    }

    /// Unwritten (`new`) notes ranked by how often they are referenced.
    pub fn recommendations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Recommendation>, GraphServiceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut reference_counts: HashMap<NoteId, usize> = HashMap::new();
        for edge in self.store.list_edges(user_id)? {
            *reference_counts.entry(edge.target_id).or_default() += 1;
        }

        let mut ranked = self
            .all_notes(user_id)?
            .into_iter()
            .filter(|note| note.status == NoteStatus::New)
            .filter_map(|note| {
                let reference_count = reference_counts.get(&note.uuid).copied().unwrap_or(0);
                (reference_count > 0).then_some(Recommendation {
                    note,
                    reference_count,
                })
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|left, right| {
            right
                .reference_count
                .cmp(&left.reference_count)
                .then_with(|| left.note.slug.cmp(&right.note.slug))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn require_note(&self, user_id: UserId, title_or_slug: &str) -> Result<Note, GraphServiceError> {
        let slug = note_key(title_or_slug);
        self.store
            .find_note_by_slug(user_id, &slug)?
            .ok_or(GraphServiceError::NoteNotFound(slug))
    }

    fn all_notes(&self, user_id: UserId) -> RepoResult<Vec<Note>> {
        // Keyed by id so rows shifting between pages are not duplicated.
        let mut notes = BTreeMap::new();
        let mut offset = 0;
        loop {
            let query = NoteListQuery {
                status: None,
                limit: Some(LIST_PAGE_SIZE),
                offset,
            };
            let page = self.store.list_notes(user_id, &query)?;
            let fetched = page.len() as u32;
            for note in page {
                notes.insert(note.uuid, note);
            }
            if fetched < LIST_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        Ok(notes.into_values().collect())
    }
}
