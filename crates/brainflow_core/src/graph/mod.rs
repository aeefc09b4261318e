//! Markdown link parsing and slug normalization.
//!
//! # Responsibility
//! - Extract `[[term]]` references from note bodies.
//! - Derive canonical slugs shared by note titles and link targets.
//!
//! # Invariants
//! - Both helpers are pure and never fail.
//! - A note title and a link term with the same text map to the same slug.

pub mod links;
pub mod slug;
