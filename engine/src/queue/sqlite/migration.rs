//! SQLite schema setup for the persistent queue.

use rusqlite::Connection;
use tracing::info;

/// Create any missing tables. Safe to run on every open.
pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Track applied migrations
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let applied: Vec<String> = {
        let mut stmt = conn.prepare("SELECT name FROM migrations")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<_, _>>()?
    };

    let mut applied_count = 0;

    // Migration 1: payload rows and successor edges
    if !applied.iter().any(|name| name == "001_create_queue") {
        conn.execute_batch(
            "BEGIN;

            CREATE TABLE queue_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL CHECK (payload <> '')
            );

            CREATE TABLE queue_edges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER NOT NULL UNIQUE REFERENCES queue_items(id),
                next_id INTEGER NOT NULL
            );

            INSERT INTO migrations (name, applied_at) VALUES ('001_create_queue', strftime('%s', 'now'));

            COMMIT;",
        )?;
        applied_count += 1;
    }

    // Migration 2: metadata scalars
    if !applied.iter().any(|name| name == "002_create_queue_meta") {
        conn.execute_batch(
            "BEGIN;

            CREATE TABLE queue_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            INSERT INTO migrations (name, applied_at) VALUES ('002_create_queue_meta', strftime('%s', 'now'));

            COMMIT;",
        )?;
        applied_count += 1;
    }

    if applied_count > 0 {
        info!(count = applied_count, "Applied SQLite migrations");
    }

    Ok(())
}
