//! Note use-case service.
//!
//! # Responsibility
//! - Provide note write/get/list/status/delete APIs addressed by title or slug.
//! - Route every content write through the graph synchronizer.
//!
//! # Invariants
//! - Title and slug inputs resolve through the same `slugify` path as links.
//! - Status updates are forward-only.
//! - Note list is sorted by `updated_at DESC, slug ASC`.

use crate::graph::slug::{note_title_from_file_name, slugify};
use crate::model::note::{Note, NoteStatus, UserId};
use crate::repo::note_repo::{normalize_note_limit, NoteListQuery};
use crate::repo::store::{GraphStore, RepoError, RepoResult};
use crate::service::graph_sync::{GraphSyncError, GraphSynchronizer, SyncOptions, SyncReport};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// No note with this slug exists for the user.
    NoteNotFound(String),
    /// Requested status would move backwards.
    StatusRegression { from: NoteStatus, to: NoteStatus },
    /// Synchronization of written content failed.
    Sync(GraphSyncError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(slug) => write!(f, "note not found: `{slug}`"),
            Self::StatusRegression { from, to } => {
                write!(f, "note status cannot move from `{from}` back to `{to}`")
            }
            Self::Sync(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<GraphSyncError> for NoteServiceError {
    fn from(value: GraphSyncError) -> Self {
        Self::Sync(value)
    }
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResult {
    pub items: Vec<Note>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Note service facade over a graph store.
pub struct NoteService<S: GraphStore> {
    synchronizer: GraphSynchronizer<S>,
}

impl<S: GraphStore> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    pub fn with_options(store: S, options: SyncOptions) -> Self {
        Self {
            synchronizer: GraphSynchronizer::with_options(store, options),
        }
    }

    pub fn store(&self) -> &S {
        self.synchronizer.store()
    }

    /// Writes note content (manual edit or generated note) and rebuilds its links.
    pub fn write_note(
        &self,
        user_id: UserId,
        title: &str,
        content: &str,
    ) -> Result<SyncReport, NoteServiceError> {
        Ok(self.synchronizer.synchronize(user_id, title, content)?)
    }

    /// Writes note content requesting a specific status.
    pub fn write_note_with_status(
        &self,
        user_id: UserId,
        title: &str,
        content: &str,
        status: NoteStatus,
    ) -> Result<SyncReport, NoteServiceError> {
        Ok(self
            .synchronizer
            .synchronize_with_status(user_id, title, content, status)?)
    }

    /// Gets one note by title, file name, or slug.
    pub fn get_note(&self, user_id: UserId, title_or_slug: &str) -> RepoResult<Option<Note>> {
        self.store()
            .find_note_by_slug(user_id, &note_key(title_or_slug))
    }

    /// Moves a note's status forward.
    pub fn update_status(
        &self,
        user_id: UserId,
        title_or_slug: &str,
        status: NoteStatus,
    ) -> Result<Note, NoteServiceError> {
        let current = self.require_note(user_id, title_or_slug)?;
        if !current.status.can_transition_to(status) {
            return Err(NoteServiceError::StatusRegression {
                from: current.status,
                to: status,
            });
        }
        if current.status == status {
            return Ok(current);
        }

        self.store()
            .update_note_status(user_id, current.uuid, status)?;
        info!(
            "event=note_status module=note status=ok note_uuid={} from={} to={}",
            current.uuid, current.status, status
        );
        self.store()
            .get_note(user_id, current.uuid)?
            .ok_or(NoteServiceError::InconsistentState(
                "note missing after status update",
            ))
    }

    /// Deletes a note explicitly. Edges to and from it go with it.
    pub fn delete_note(&self, user_id: UserId, title_or_slug: &str) -> Result<Note, NoteServiceError> {
        let note = self.require_note(user_id, title_or_slug)?;
        self.store().delete_note(user_id, note.uuid)?;
        info!(
            "event=note_delete module=note status=ok note_uuid={}",
            note.uuid
        );
        Ok(note)
    }

    /// Lists notes with optional status filter and pagination.
    pub fn list_notes(
        &self,
        user_id: UserId,
        status: Option<NoteStatus>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<NotesListResult, NoteServiceError> {
        let applied_limit = normalize_note_limit(limit);
        let query = NoteListQuery {
            status,
            limit: Some(applied_limit),
            offset,
        };
        let items = self.store().list_notes(user_id, &query)?;
        Ok(NotesListResult {
            items,
            applied_limit,
        })
    }

    fn require_note(&self, user_id: UserId, title_or_slug: &str) -> Result<Note, NoteServiceError> {
        let slug = note_key(title_or_slug);
        self.store()
            .find_note_by_slug(user_id, &slug)?
            .ok_or(NoteServiceError::NoteNotFound(slug))
    }
}

/// Maps a title, file name, or slug to the slug addressing the note.
pub fn note_key(title_or_slug: &str) -> String {
    slugify(&note_title_from_file_name(title_or_slug))
}

#[cfg(test)]
mod tests {
    use super::note_key;

    #[test]
    fn note_key_accepts_titles_files_and_slugs() {
        assert_eq!(note_key("Intro to Graphs"), "intro-to-graphs");
        assert_eq!(note_key("notes/Intro to Graphs.md"), "intro-to-graphs");
        assert_eq!(note_key("intro-to-graphs"), "intro-to-graphs");
    }
}
