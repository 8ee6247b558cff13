//! Configuration management for `stride`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. Environment variables (`STRIDE_DIR`)
//! 2. Workspace config (.stride/config.yaml)
//! 3. Defaults
//!
//! The active workspace is the nearest ancestor directory containing a
//! `.stride` directory, like a VCS root.

use crate::error::{Result, StrideError};
use crate::storage::SqliteStorage;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default database filename used when metadata is missing.
const DEFAULT_DB_FILENAME: &str = "stride.db";

/// Startup metadata describing the database location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub database: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            database: DEFAULT_DB_FILENAME.to_string(),
        }
    }
}

impl Metadata {
    /// Load metadata.json from the stride directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(stride_dir: &Path) -> Result<Self> {
        let path = stride_dir.join("metadata.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let mut metadata: Self = serde_json::from_str(&contents)?;

        if metadata.database.trim().is_empty() {
            metadata.database = DEFAULT_DB_FILENAME.to_string();
        }

        Ok(metadata)
    }
}

/// Workspace settings from `.stride/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Consult the keyword suggester for new tasks with no list/labels.
    pub suggestions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { suggestions: true }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(stride_dir: &Path) -> Result<Self> {
        let path = stride_dir.join("config.yaml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Resolved paths for this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub stride_dir: PathBuf,
    pub db_path: PathBuf,
    pub metadata: Metadata,
}

impl ConfigPaths {
    /// Resolve the database path using metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata cannot be read.
    pub fn resolve(stride_dir: &Path) -> Result<Self> {
        let metadata = Metadata::load(stride_dir)?;
        let db_path = stride_dir.join(&metadata.database);
        Ok(Self {
            stride_dir: stride_dir.to_path_buf(),
            db_path,
            metadata,
        })
    }
}

/// Discover the active `.stride` directory.
///
/// Honors `STRIDE_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns [`StrideError::NotInitialized`] if no stride directory is found.
pub fn discover_stride_dir(start: Option<&Path>) -> Result<PathBuf> {
    if let Ok(value) = env::var("STRIDE_DIR") {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(".stride");
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(StrideError::NotInitialized);
        }
    }
}

/// Create a `.stride` directory (with metadata) under `root`. Idempotent.
///
/// # Errors
///
/// Returns an error if the directory or metadata cannot be written.
pub fn init_stride_dir(root: &Path) -> Result<PathBuf> {
    let stride_dir = root.join(".stride");
    fs::create_dir_all(&stride_dir)?;

    let metadata_path = stride_dir.join("metadata.json");
    if !metadata_path.exists() {
        let metadata = Metadata::default();
        fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;
    }

    Ok(stride_dir)
}

/// Open storage for the given stride directory.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub fn open_storage(stride_dir: &Path) -> Result<SqliteStorage> {
    let paths = ConfigPaths::resolve(stride_dir)?;
    SqliteStorage::open(&paths.db_path)
}
