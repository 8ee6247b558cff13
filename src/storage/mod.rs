//! `SQLite` storage layer for `stride`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - WAL mode for concurrent reads
//! - Transaction discipline for atomic writes
//! - Best-effort activity logging that never fails the primary mutation
//!
//! # Submodules
//!
//! - [`logs`] - Activity log storage (insertion, retrieval)
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main `SQLite` storage implementation

pub mod logs;
pub mod schema;
pub mod sqlite;

pub use sqlite::{MutationContext, SqliteStorage};
