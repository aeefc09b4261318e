//! Edge repository contract and SQLite implementation.
//!
//! # Invariants
//! - Reads return edges ordered by `id ASC`, i.e. insertion order.
//! - `delete_edges_from` only touches rows whose source is the given note.

use crate::model::edge::{Edge, EdgeId, NewEdge, RelationshipKind};
use crate::model::note::{NoteId, UserId};
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteGraphStore};
use rusqlite::{params, params_from_iter, Row};

const EDGE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    source_uuid,
    target_uuid,
    relationship,
    created_at
FROM edges";

/// Repository interface for edge persistence.
pub trait EdgeRepository {
    /// Inserts one edge and returns its generated id.
    fn insert_edge(&self, edge: &NewEdge) -> RepoResult<EdgeId>;
    /// Deletes every edge whose source is `source_id`. Returns the removed count.
    fn delete_edges_from(&self, user_id: UserId, source_id: NoteId) -> RepoResult<usize>;
    /// Lists edges leaving `source_id`.
    fn list_outgoing(&self, user_id: UserId, source_id: NoteId) -> RepoResult<Vec<Edge>>;
    /// Lists edges arriving at `target_id`.
    fn list_incoming(&self, user_id: UserId, target_id: NoteId) -> RepoResult<Vec<Edge>>;
    /// Lists every edge owned by the user.
    fn list_edges(&self, user_id: UserId) -> RepoResult<Vec<Edge>>;
}

impl EdgeRepository for SqliteGraphStore<'_> {
    fn insert_edge(&self, edge: &NewEdge) -> RepoResult<EdgeId> {
        self.conn.execute(
            "INSERT INTO edges (user_id, source_uuid, target_uuid, relationship)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                edge.user_id.to_string(),
                edge.source_id.to_string(),
                edge.target_id.to_string(),
                edge.relationship.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_edges_from(&self, user_id: UserId, source_id: NoteId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM edges WHERE user_id = ?1 AND source_uuid = ?2;",
            params![user_id.to_string(), source_id.to_string()],
        )?;
        Ok(removed)
    }

    fn list_outgoing(&self, user_id: UserId, source_id: NoteId) -> RepoResult<Vec<Edge>> {
        query_edges(
            self,
            &format!("{EDGE_SELECT_SQL} WHERE user_id = ?1 AND source_uuid = ?2 ORDER BY id ASC;"),
            &[user_id.to_string(), source_id.to_string()],
        )
    }

    fn list_incoming(&self, user_id: UserId, target_id: NoteId) -> RepoResult<Vec<Edge>> {
        query_edges(
            self,
            &format!("{EDGE_SELECT_SQL} WHERE user_id = ?1 AND target_uuid = ?2 ORDER BY id ASC;"),
            &[user_id.to_string(), target_id.to_string()],
        )
    }

    fn list_edges(&self, user_id: UserId) -> RepoResult<Vec<Edge>> {
        query_edges(
            self,
            &format!("{EDGE_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"),
            &[user_id.to_string()],
        )
    }
}

fn query_edges(
    store: &SqliteGraphStore<'_>,
    sql: &str,
    bind_values: &[String],
) -> RepoResult<Vec<Edge>> {
    let mut stmt = store.conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
    let mut edges = Vec::new();
    while let Some(row) = rows.next()? {
        edges.push(parse_edge_row(row)?);
    }
    Ok(edges)
}

fn parse_edge_row(row: &Row<'_>) -> RepoResult<Edge> {
    let user_text: String = row.get("user_id")?;
    let source_text: String = row.get("source_uuid")?;
    let target_text: String = row.get("target_uuid")?;
    let relationship_text: String = row.get("relationship")?;
    let relationship = RelationshipKind::parse(&relationship_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid relationship `{relationship_text}` in edges.relationship"
        ))
    })?;

    Ok(Edge {
        id: row.get("id")?,
        user_id: parse_uuid(&user_text, "edges.user_id")?,
        source_id: parse_uuid(&source_text, "edges.source_uuid")?,
        target_id: parse_uuid(&target_text, "edges.target_uuid")?,
        relationship,
        created_at: row.get("created_at")?,
    })
}
