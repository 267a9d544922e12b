//! Auth database: username/password pairs.
//!
//! Kept in its own SQLite file, separate from the clinical store, with its
//! own schema_version table and migration numbering.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing;

use super::sqlite::get_current_version;
use super::{ensure_parent_dir, DatabaseError};

/// Location of the auth store; one connection per operation.
#[derive(Debug, Clone)]
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(&self) -> Result<Connection, DatabaseError> {
        open_auth_database(&self.path)
    }
}

/// Open (or create) the auth database at `path` and run migrations.
pub fn open_auth_database(path: &Path) -> Result<Connection, DatabaseError> {
    ensure_parent_dir(path)?;
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_auth_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory auth database (for testing).
pub fn open_memory_auth_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_auth_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

fn run_auth_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/auth_migrations/001_users.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running auth migration v{version}");
            conn.execute_batch(sql).map_err(|e| {
                DatabaseError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                }
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::count_tables;

    #[test]
    fn auth_database_initializes_all_tables() {
        let conn = open_memory_auth_database().unwrap();
        // schema_version + users
        assert_eq!(count_tables(&conn).unwrap(), 2);
    }

    #[test]
    fn auth_migration_idempotent() {
        let conn = open_memory_auth_database().unwrap();
        assert!(run_auth_migrations(&conn).is_ok());
    }

    #[test]
    fn username_unique_constraint() {
        let conn = open_memory_auth_database().unwrap();
        conn.execute(
            "INSERT INTO users (username, password) VALUES ('alice', 'a')",
            [],
        )
        .unwrap();

        let err = conn
            .execute(
                "INSERT INTO users (username, password) VALUES ('alice', 'b')",
                [],
            )
            .map_err(DatabaseError::from)
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn auth_database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_db.sqlite");
        let conn = open_auth_database(&path).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 2);

        let conn2 = open_auth_database(&path).unwrap();
        assert_eq!(count_tables(&conn2).unwrap(), 2);
    }
}
