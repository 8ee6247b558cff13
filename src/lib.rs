//! `stride` - personal task planner library
//!
//! This crate provides the core functionality for the `stride` CLI tool:
//! lists, labels, recurring tasks, subtasks, dependencies, reminders,
//! templates and a small gamification layer (XP, levels, achievements),
//! all backed by `SQLite`.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Task, List, Label, TaskLog, UserStats, ...)
//! - [`storage`] - `SQLite` database layer
//! - [`engine`] - Task lifecycle orchestration (completion, recurrence,
//!   dependencies, gamification, templates)
//! - [`config`] - Workspace discovery and settings
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod storage;

pub use error::{Result, StrideError};
