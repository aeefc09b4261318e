//! Note-graph synchronizer.
//!
//! # Responsibility
//! - Turn one note's Markdown into persisted note and edge state.
//! - Create ghost notes for `[[term]]` references to notes that do not exist yet.
//!
//! # Invariants
//! - After a successful call, the source note's outgoing edges are exactly
//!   one `related_to` edge per extracted term, in extraction order
//!   (duplicates included), minus terms whose target could not be resolved.
//! - A failed primary upsert leaves edges untouched.
//! - A failed target resolution skips that one edge and never fails the call.
//! - Steps run strictly in order; there is no lock and no transaction around
//!   the delete/insert rebuild.

use crate::graph::links::extract_links;
use crate::graph::slug::{note_title_from_file_name, slugify};
use crate::model::edge::{EdgeId, NewEdge};
use crate::model::note::{Note, NoteDraft, NoteId, NoteStatus, UserId};
use crate::repo::store::{GraphStore, RepoError};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Synchronization failure surfaced to the caller.
#[derive(Debug)]
pub enum GraphSyncError {
    /// Requested status cannot be held by written content; nothing was written.
    InvalidStatus(NoteStatus),
    /// Primary note upsert failed; no edge work was attempted.
    NoteUpsert(RepoError),
    /// Clearing the previous outgoing edges failed.
    EdgeDelete { note_id: NoteId, source: RepoError },
    /// Inserting an edge failed after earlier edges may already exist.
    EdgeInsert {
        note_id: NoteId,
        target_id: NoteId,
        source: RepoError,
    },
}

impl Display for GraphSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(status) => write!(
                f,
                "status `{status}` is reserved for unwritten notes; expected in-progress|understood"
            ),
            Self::NoteUpsert(err) => write!(f, "note upsert failed: {err}"),
            Self::EdgeDelete { note_id, source } => {
                write!(f, "clearing edges of note {note_id} failed: {source}")
            }
            Self::EdgeInsert {
                note_id,
                target_id,
                source,
            } => write!(
                f,
                "inserting edge {note_id} -> {target_id} failed: {source}"
            ),
        }
    }
}

impl Error for GraphSyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidStatus(_) => None,
            Self::NoteUpsert(err) => Some(err),
            Self::EdgeDelete { source, .. } => Some(source),
            Self::EdgeInsert { source, .. } => Some(source),
        }
    }
}

/// Tunables for one synchronizer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Status requested for written content. Existing notes are only promoted.
    pub status: NoteStatus,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            status: NoteStatus::InProgress,
        }
    }
}

/// One edge written during a synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedTarget {
    /// Raw term as written between `[[` and `]]`.
    pub term: String,
    pub target_slug: String,
    pub target_id: NoteId,
    pub edge_id: EdgeId,
    /// Whether this term created the ghost it points to.
    pub ghost_created: bool,
}

/// Outcome of one successful synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Stored source note after the upsert.
    pub note: Note,
    /// Every extracted term in order.
    pub terms: Vec<String>,
    pub links: Vec<LinkedTarget>,
    /// Number of outgoing edges cleared before the rebuild.
    pub removed_edges: usize,
    /// Terms whose target could not be resolved or created.
    pub skipped_terms: Vec<String>,
}

impl SyncReport {
    /// Number of ghost notes created by this call.
    pub fn ghosts_created(&self) -> usize {
        self.links.iter().filter(|link| link.ghost_created).count()
    }
}

/// Derives note and edge state from Markdown content.
pub struct GraphSynchronizer<S: GraphStore> {
    store: S,
    options: SyncOptions,
}

impl<S: GraphStore> GraphSynchronizer<S> {
    /// Creates a synchronizer with default options.
    pub fn new(store: S) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    pub fn with_options(store: S, options: SyncOptions) -> Self {
        Self { store, options }
    }

    /// Underlying store, for read paths that share this instance.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Synchronizes one note from its file name (or title) and Markdown body.
    ///
    /// # Errors
    /// - [`GraphSyncError::NoteUpsert`] when the note row cannot be written.
    /// - [`GraphSyncError::EdgeDelete`] / [`GraphSyncError::EdgeInsert`] when the
    ///   edge rebuild fails; steps already done are not rolled back.
    pub fn synchronize(
        &self,
        user_id: UserId,
        file_name: &str,
        content: &str,
    ) -> Result<SyncReport, GraphSyncError> {
        self.synchronize_with_status(user_id, file_name, content, self.options.status)
    }

    /// Same as [`Self::synchronize`] with an explicit requested status.
    ///
    /// # Errors
    /// - [`GraphSyncError::InvalidStatus`] for [`NoteStatus::New`], before any write.
    pub fn synchronize_with_status(
        &self,
        user_id: UserId,
        file_name: &str,
        content: &str,
        status: NoteStatus,
    ) -> Result<SyncReport, GraphSyncError> {
        if !status.allows_content() {
            warn!("event=graph_sync module=graph status=rejected requested_status={status}");
            return Err(GraphSyncError::InvalidStatus(status));
        }
        let started_at = Instant::now();
        let title = note_title_from_file_name(file_name);
        let slug = slugify(&title);
        let draft = NoteDraft::synced(user_id, title, slug, content, status);
        info!(
            "event=graph_sync module=graph status=start content_len={}",
            content.len()
        );

        let note = self.store.upsert_note(&draft).map_err(|err| {
            error!(
                "event=graph_sync module=graph status=error stage=note_upsert duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            GraphSyncError::NoteUpsert(err)
        })?;

        let terms = extract_links(content);

        let removed_edges = self
            .store
            .delete_edges_from(user_id, note.uuid)
            .map_err(|source| {
                error!(
                    "event=graph_sync module=graph status=error stage=edge_delete note_uuid={} error={source}",
                    note.uuid
                );
                GraphSyncError::EdgeDelete {
                    note_id: note.uuid,
                    source,
                }
            })?;

        let mut links = Vec::with_capacity(terms.len());
        let mut skipped_terms = Vec::new();
        for term in &terms {
            let target_slug = slugify(term);
            let resolved = match self
                .store
                .resolve_or_create_note(user_id, &target_slug, term)
            {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(
                        "event=ghost_resolve module=graph status=error note_uuid={} error={err}",
                        note.uuid
                    );
                    skipped_terms.push((*term).to_string());
                    continue;
                }
            };

            let edge = NewEdge::related(user_id, note.uuid, resolved.note_id);
            let edge_id = self.store.insert_edge(&edge).map_err(|source| {
                error!(
                    "event=graph_sync module=graph status=error stage=edge_insert note_uuid={} target_uuid={} error={source}",
                    note.uuid, resolved.note_id
                );
                GraphSyncError::EdgeInsert {
                    note_id: note.uuid,
                    target_id: resolved.note_id,
                    source,
                }
            })?;

            links.push(LinkedTarget {
                term: (*term).to_string(),
                target_slug,
                target_id: resolved.note_id,
                edge_id,
                ghost_created: resolved.created,
            });
        }

        let report = SyncReport {
            note,
            terms: terms.iter().map(|term| (*term).to_string()).collect(),
            links,
            removed_edges,
            skipped_terms,
        };
        info!(
            "event=graph_sync module=graph status=ok note_uuid={} terms={} edges_removed={} edges_inserted={} ghosts_created={} skipped={} duration_ms={}",
            report.note.uuid,
            report.terms.len(),
            report.removed_edges,
            report.links.len(),
            report.ghosts_created(),
            report.skipped_terms.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}
