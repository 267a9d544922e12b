use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing;

use super::{ensure_parent_dir, DatabaseError};

/// Location of the clinical store. Every operation opens its own
/// connection through [`ClinicalStore::open`] and drops it when done.
#[derive(Debug, Clone)]
pub struct ClinicalStore {
    path: PathBuf,
}

impl ClinicalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(&self) -> Result<Connection, DatabaseError> {
        open_clinical_database(&self.path)
    }
}

/// Open the clinical store at `path`, creating the schema if absent.
///
/// Parent directories are created on demand. Each caller owns the returned
/// connection; dropping it closes the file handle.
pub fn open_clinical_database(path: &Path) -> Result<Connection, DatabaseError> {
    ensure_parent_dir(path)?;
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory clinical store (for testing)
pub fn open_memory_clinical_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    // Foreign keys are declared in the schema but intentionally not enforced:
    // health records may reference a patient id that does not exist.
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=OFF;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Run all pending clinical migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_clinical.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running clinical migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
pub(crate) fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
