//! SQLite scalar metadata slots.

use rusqlite::{params, Connection, OptionalExtension};

/// Read one scalar, falling back to `default` when the key was never written.
pub fn get_long(conn: &Connection, key: &str, default: i64) -> Result<i64, rusqlite::Error> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT value FROM queue_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or(default))
}

/// Write all scalars atomically.
///
/// Runs inside a savepoint, so it nests in the engine's transaction and is
/// still all-or-nothing when called on its own.
pub fn put_all(conn: &Connection, entries: &[(&str, i64)]) -> Result<(), rusqlite::Error> {
    conn.execute_batch("SAVEPOINT queue_meta")?;

    let written = entries.iter().try_for_each(|(key, value)| {
        conn.execute(
            "INSERT INTO queue_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map(|_| ())
    });

    match written {
        Ok(()) => conn.execute_batch("RELEASE queue_meta"),
        Err(e) => {
            conn.execute_batch("ROLLBACK TO queue_meta; RELEASE queue_meta")?;
            Err(e)
        }
    }
}
