pub mod auth_db;
pub mod sqlite;
pub mod repository;

pub use auth_db::*;
pub use sqlite::*;
pub use repository::*;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::form::FormError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid form input: {0}")]
    InvalidForm(#[from] FormError),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Cannot create data directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Local wall-clock timestamp, as stored in `created_at` columns and shown
/// on reports.
pub(crate) fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Create the parent directory of a database file if it is missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), DatabaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

impl DatabaseError {
    /// True when SQLite rejected the write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}
