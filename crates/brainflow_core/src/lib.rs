//! Core domain logic for BrainFlow's note graph.
//! This crate is the single source of truth for note/edge invariants.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use graph::links::extract_links;
pub use graph::slug::{note_title_from_file_name, slugify};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::edge::{Edge, EdgeId, NewEdge, RelationshipKind};
pub use model::note::{Note, NoteDraft, NoteId, NoteStatus, UserId};
pub use repo::edge_repo::EdgeRepository;
pub use repo::note_repo::{NoteListQuery, NoteRepository, ResolvedNote};
pub use repo::store::{GraphStore, RepoError, RepoResult, SqliteGraphStore};
pub use service::graph_service::{
    GraphLink, GraphNode, GraphService, GraphServiceError, GraphView, Recommendation,
};
pub use service::graph_sync::{
    GraphSyncError, GraphSynchronizer, LinkedTarget, SyncOptions, SyncReport,
};
pub use service::note_service::{NoteService, NoteServiceError, NotesListResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
