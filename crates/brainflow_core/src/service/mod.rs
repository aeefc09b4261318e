//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate graph store calls into use-case level APIs.
//! - Keep CLI/front-end layers decoupled from storage details.

pub mod graph_service;
pub mod graph_sync;
pub mod note_service;
