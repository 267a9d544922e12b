use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;

pub fn user_exists(conn: &Connection, username: &str) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            params![username],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_user(conn: &Connection, username: &str, password: &str) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, password) VALUES (?1, ?2)",
        params![username, password],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Stored password for `username`, if the user exists.
pub fn get_user_password(conn: &Connection, username: &str) -> Result<Option<String>, DatabaseError> {
    let password = conn
        .query_row(
            "SELECT password FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    Ok(password)
}

pub fn count_users(conn: &Connection, username: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count)
}
