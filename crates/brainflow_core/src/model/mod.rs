//! Domain model for the per-user note graph.
//!
//! # Responsibility
//! - Define canonical note and edge records used by core business logic.
//! - Keep status ordering rules next to the status type.
//!
//! # Invariants
//! - Every note is owned by exactly one `UserId` and addressed by `(user_id, slug)`.
//! - Edges never cross user boundaries.

pub mod edge;
pub mod note;
