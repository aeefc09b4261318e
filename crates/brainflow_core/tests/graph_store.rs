use brainflow_core::db::open_db_in_memory;
use brainflow_core::{
    EdgeRepository, NewEdge, NoteDraft, NoteListQuery, NoteRepository, NoteStatus, RepoError,
    SqliteGraphStore,
};
use rusqlite::params;
use uuid::Uuid;

fn draft(user_id: Uuid, title: &str, slug: &str, content: &str, status: NoteStatus) -> NoteDraft {
    NoteDraft::synced(user_id, title, slug, content, status)
}

#[test]
fn upsert_inserts_then_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let created = store
        .upsert_note(&draft(user, "Graphs", "graphs", "v1", NoteStatus::InProgress))
        .unwrap();
    let updated = store
        .upsert_note(&draft(user, "GRAPHS", "graphs", "v2", NoteStatus::InProgress))
        .unwrap();

    assert_eq!(created.uuid, updated.uuid);
    assert_eq!(updated.title, "GRAPHS");
    assert_eq!(updated.content.as_deref(), Some("v2"));
    assert_eq!(
        store.list_notes(user, &NoteListQuery::default()).unwrap().len(),
        1
    );
}

#[test]
fn upsert_promotes_but_never_demotes_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let resolved = store.resolve_or_create_note(user, "graphs", "Graphs").unwrap();
    let ghost = store.get_note(user, resolved.note_id).unwrap().unwrap();
    assert_eq!(ghost.status, NoteStatus::New);

    let written = store
        .upsert_note(&draft(user, "Graphs", "graphs", "body", NoteStatus::InProgress))
        .unwrap();
    assert_eq!(written.status, NoteStatus::InProgress);

    let promoted = store
        .upsert_note(&draft(user, "Graphs", "graphs", "body", NoteStatus::Understood))
        .unwrap();
    assert_eq!(promoted.status, NoteStatus::Understood);

    let kept = store
        .upsert_note(&draft(user, "Graphs", "graphs", "body", NoteStatus::New))
        .unwrap();
    assert_eq!(kept.status, NoteStatus::Understood);
}

#[test]
fn resolve_or_create_reports_creation_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let first = store.resolve_or_create_note(user, "trees", "Trees").unwrap();
    let second = store.resolve_or_create_note(user, "trees", "TREES").unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.note_id, second.note_id);

    let ghost = store.find_note_by_slug(user, "trees").unwrap().unwrap();
    assert_eq!(ghost.title, "Trees");
    assert!(ghost.is_ghost());
}

#[test]
fn delete_note_cascades_to_incoming_and_outgoing_edges() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let a = store.resolve_or_create_note(user, "a", "A").unwrap().note_id;
    let b = store.resolve_or_create_note(user, "b", "B").unwrap().note_id;
    let c = store.resolve_or_create_note(user, "c", "C").unwrap().note_id;
    store.insert_edge(&NewEdge::related(user, a, b)).unwrap();
    store.insert_edge(&NewEdge::related(user, b, c)).unwrap();
    store.insert_edge(&NewEdge::related(user, a, c)).unwrap();

    store.delete_note(user, b).unwrap();

    let remaining = store.list_edges(user).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].source_id, a);
    assert_eq!(remaining[0].target_id, c);
}

#[test]
fn edge_ids_follow_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let a = store.resolve_or_create_note(user, "a", "A").unwrap().note_id;
    let b = store.resolve_or_create_note(user, "b", "B").unwrap().note_id;
    let first = store.insert_edge(&NewEdge::related(user, a, b)).unwrap();
    let second = store.insert_edge(&NewEdge::related(user, a, a)).unwrap();
    assert!(second > first);

    let outgoing = store.list_outgoing(user, a).unwrap();
    assert_eq!(
        outgoing.iter().map(|edge| edge.id).collect::<Vec<_>>(),
        vec![first, second]
    );
    assert_eq!(store.list_incoming(user, b).unwrap().len(), 1);
    assert_eq!(store.delete_edges_from(user, a).unwrap(), 2);
    assert!(store.list_edges(user).unwrap().is_empty());
}

#[test]
fn operations_never_cross_user_scope() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let note = store.resolve_or_create_note(owner, "a", "A").unwrap().note_id;

    assert!(store.get_note(stranger, note).unwrap().is_none());
    assert!(store.find_note_by_slug(stranger, "a").unwrap().is_none());
    assert!(matches!(
        store.update_note_status(stranger, note, NoteStatus::Understood),
        Err(RepoError::NotFound(id)) if id == note
    ));
    assert!(matches!(
        store.delete_note(stranger, note),
        Err(RepoError::NotFound(_))
    ));
    assert!(store.get_note(owner, note).unwrap().is_some());
}

#[test]
fn list_notes_filters_by_status_and_orders_by_recency() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();

    let older = store
        .upsert_note(&draft(user, "Older", "older", "x", NoteStatus::InProgress))
        .unwrap();
    let newer = store
        .upsert_note(&draft(user, "Newer", "newer", "x", NoteStatus::InProgress))
        .unwrap();
    store.resolve_or_create_note(user, "ghost", "Ghost").unwrap();

    conn.execute(
        "UPDATE notes SET updated_at = 1000 WHERE uuid = ?1;",
        params![older.uuid.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE notes SET updated_at = 2000 WHERE uuid = ?1;",
        params![newer.uuid.to_string()],
    )
    .unwrap();

    let in_progress = store
        .list_notes(
            user,
            &NoteListQuery {
                status: Some(NoteStatus::InProgress),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(
        in_progress.iter().map(|note| note.slug.as_str()).collect::<Vec<_>>(),
        vec!["newer", "older"]
    );

    let ghosts = store
        .list_notes(
            user,
            &NoteListQuery {
                status: Some(NoteStatus::New),
                ..NoteListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].slug, "ghost");

    let paged = store
        .list_notes(
            user,
            &NoteListQuery {
                status: None,
                limit: Some(1),
                offset: 1,
            },
        )
        .unwrap();
    assert_eq!(paged.len(), 1);
}

#[test]
fn invalid_persisted_status_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteGraphStore::try_new(&conn).unwrap();
    let user = Uuid::new_v4();
    let note = store.resolve_or_create_note(user, "a", "A").unwrap().note_id;

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
    conn.execute(
        "UPDATE notes SET status = 'mastered' WHERE uuid = ?1;",
        params![note.to_string()],
    )
    .unwrap();

    let err = store.get_note(user, note).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("mastered")));
}
