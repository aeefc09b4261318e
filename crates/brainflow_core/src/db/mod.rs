//! Graph database: the `notes` and `edges` tables behind every store.
//!
//! Edges reference notes by uuid with `ON DELETE CASCADE`, so a connection is
//! only handed out once foreign keys are confirmed on and the schema is at
//! [`migrations::latest_version`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the graph database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; its graph layout is unknown here.
    SchemaTooNew { found: u32, supported: u32 },
    /// SQLite refused `PRAGMA foreign_keys = ON`; deleting a note would orphan its edges.
    ForeignKeysUnavailable,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "graph database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "note graph schema v{found} is newer than this build understands (v{supported})"
            ),
            Self::ForeignKeysUnavailable => f.write_str(
                "foreign keys could not be enabled; edge cascades on note delete would not run",
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::ForeignKeysUnavailable => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
