//! Graph store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the note/edge operations the synchronizer and services depend on.
//! - Isolate SQL details from graph maintenance logic.
//!
//! # Invariants
//! - Every operation is scoped by the owning `UserId`.
//! - No operation spans both tables in one transaction; callers sequence them.

pub mod edge_repo;
pub mod note_repo;
pub mod store;
