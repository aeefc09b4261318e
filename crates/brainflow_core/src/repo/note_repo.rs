//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide user-scoped note lookup, upsert, get-or-create, and status writes.
//! - Own the `(user_id, slug)` conflict handling for note writes.
//!
//! # Invariants
//! - Upserts keep the existing `uuid`, so edges pointing at a ghost survive
//!   its promotion to a written note.
//! - Upserts never demote `status` (same ordering as `NoteStatus::promote`).
//! - Ghosts are created with `content = NULL`, `status = 'new'`.

use crate::model::note::{Note, NoteDraft, NoteId, NoteStatus, UserId};
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteGraphStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use uuid::Uuid;

const NOTES_DEFAULT_LIMIT: u32 = 20;
const NOTES_LIMIT_MAX: u32 = 200;

const NOTE_COLUMNS: &str = "uuid,
    user_id,
    title,
    slug,
    content,
    status,
    is_generated,
    created_at,
    updated_at";

/// Result of the get-or-create lookup for a link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNote {
    pub note_id: NoteId,
    /// `true` when a ghost row was inserted by this call.
    pub created: bool,
}

/// Query options for listing one user's notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Optional exact status filter.
    pub status: Option<NoteStatus>,
    /// Maximum rows to return. Defaults to 20 and clamps to 200.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Gets the note addressed by `(user_id, slug)`.
    fn find_note_by_slug(&self, user_id: UserId, slug: &str) -> RepoResult<Option<Note>>;
    /// Gets one note by id within the user's scope.
    fn get_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Inserts or updates the note keyed by `(draft.user_id, draft.slug)`.
    fn upsert_note(&self, draft: &NoteDraft) -> RepoResult<Note>;
    /// Returns the note for `slug`, creating a ghost titled `display_title` if absent.
    fn resolve_or_create_note(
        &self,
        user_id: UserId,
        slug: &str,
        display_title: &str,
    ) -> RepoResult<ResolvedNote>;
    /// Lists notes with optional status filter and pagination.
    fn list_notes(&self, user_id: UserId, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Overwrites the status of one note.
    fn update_note_status(
        &self,
        user_id: UserId,
        note_id: NoteId,
        status: NoteStatus,
    ) -> RepoResult<()>;
    /// Hard-deletes one note. Edges touching it are removed with it.
    fn delete_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<()>;
}

impl NoteRepository for SqliteGraphStore<'_> {
    fn find_note_by_slug(&self, user_id: UserId, slug: &str) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             WHERE user_id = ?1 AND slug = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), slug])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             WHERE user_id = ?1 AND uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), note_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn upsert_note(&self, draft: &NoteDraft) -> RepoResult<Note> {
        // The status CASE mirrors `NoteStatus::promote`.
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO notes (uuid, user_id, title, slug, content, status, is_generated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id, slug) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                status = CASE
                    WHEN notes.status = 'new' THEN excluded.status
                    WHEN notes.status = 'in-progress' AND excluded.status = 'understood'
                        THEN excluded.status
                    ELSE notes.status
                END,
                is_generated = excluded.is_generated,
                updated_at = (strftime('%s', 'now') * 1000)
             RETURNING {NOTE_COLUMNS};"
        ))?;
        let mut rows = stmt.query(params![
            Uuid::new_v4().to_string(),
            draft.user_id.to_string(),
            draft.title.as_str(),
            draft.slug.as_str(),
            draft.content.as_deref(),
            draft.status.as_str(),
            bool_to_int(draft.is_generated),
        ])?;
        match rows.next()? {
            Some(row) => parse_note_row(row),
            None => Err(RepoError::InvalidData(format!(
                "upsert for slug `{}` returned no row",
                draft.slug
            ))),
        }
    }

    fn resolve_or_create_note(
        &self,
        user_id: UserId,
        slug: &str,
        display_title: &str,
    ) -> RepoResult<ResolvedNote> {
        if let Some(existing) = self.find_note_by_slug(user_id, slug)? {
            return Ok(ResolvedNote {
                note_id: existing.uuid,
                created: false,
            });
        }

        // DO NOTHING keeps a concurrent writer's row if one landed in between.
        let inserted = self.conn.execute(
            "INSERT INTO notes (uuid, user_id, title, slug, content, status, is_generated)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, 1)
             ON CONFLICT (user_id, slug) DO NOTHING;",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                display_title,
                slug,
                NoteStatus::New.as_str(),
            ],
        )?;

        match self.find_note_by_slug(user_id, slug)? {
            Some(note) => Ok(ResolvedNote {
                note_id: note.uuid,
                created: inserted == 1,
            }),
            None => Err(RepoError::InvalidData(format!(
                "note `{slug}` missing after get-or-create"
            ))),
        }
    }

    fn list_notes(&self, user_id: UserId, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             WHERE user_id = ?"
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, slug ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_note_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_note_status(
        &self,
        user_id: UserId,
        note_id: NoteId,
        status: NoteStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                status = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_id = ?1 AND uuid = ?2;",
            params![user_id.to_string(), note_id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }
        Ok(())
    }

    fn delete_note(&self, user_id: UserId, note_id: NoteId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE user_id = ?1 AND uuid = ?2;",
            params![user_id.to_string(), note_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }
        Ok(())
    }
}

/// Normalizes list limit according to the notes listing contract.
pub fn normalize_note_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => NOTES_DEFAULT_LIMIT,
        Some(value) if value > NOTES_LIMIT_MAX => NOTES_LIMIT_MAX,
        Some(value) => value,
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_id")?;
    let status_text: String = row.get("status")?;
    let status = NoteStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in notes.status"))
    })?;
    let is_generated = match row.get::<_, i64>("is_generated")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_generated value `{other}` in notes.is_generated"
            )));
        }
    };

    Ok(Note {
        uuid: parse_uuid(&uuid_text, "notes.uuid")?,
        user_id: parse_uuid(&user_text, "notes.user_id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        content: row.get("content")?,
        status,
        is_generated,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
