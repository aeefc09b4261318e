//! Store error type, the combined `GraphStore` seam, and the SQLite store.
//!
//! # Invariants
//! - `SqliteGraphStore` is only constructed on connections whose schema has
//!   the `notes` and `edges` tables with the expected columns.

use crate::db::DbError;
use crate::model::note::NoteId;
use crate::repo::edge_repo::EdgeRepository;
use crate::repo::note_repo::NoteRepository;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for note/edge operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted graph data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "graph store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "graph store requires column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything the synchronizer and graph services need from persistence.
pub trait GraphStore: NoteRepository + EdgeRepository {}

impl<T: NoteRepository + EdgeRepository> GraphStore for T {}

/// SQLite-backed graph store borrowing a ready connection.
pub struct SqliteGraphStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteGraphStore<'conn> {
    /// Builds a store after checking the connection carries the graph schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "notes",
        &[
            "uuid",
            "user_id",
            "title",
            "slug",
            "content",
            "status",
            "is_generated",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "edges",
        &[
            "id",
            "user_id",
            "source_uuid",
            "target_uuid",
            "relationship",
            "created_at",
        ],
    ),
];

fn ensure_graph_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
