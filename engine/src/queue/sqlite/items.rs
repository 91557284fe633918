//! SQLite item and edge operations.
//!
//! Payload rows are written once and deleted once. All linkage changes go
//! through the fixed-width `queue_edges` rows.

use rusqlite::{params, Connection, OptionalExtension};

use crate::queue::types::{id_from_raw, id_to_raw, ItemId, StoredItem};

/// Insert a payload row, returning the assigned id.
pub fn insert_item(conn: &Connection, payload: &str) -> Result<ItemId, rusqlite::Error> {
    conn.execute(
        "INSERT INTO queue_items (payload) VALUES (?1)",
        params![payload],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Create the outgoing edge of `parent`.
pub fn insert_edge(
    conn: &Connection,
    parent: ItemId,
    next: Option<ItemId>,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO queue_edges (parent_id, next_id) VALUES (?1, ?2)",
        params![parent, id_to_raw(next)],
    )?;
    Ok(())
}

/// Point the edge of `parent` at `next`.
pub fn update_edge(
    conn: &Connection,
    parent: ItemId,
    next: Option<ItemId>,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "UPDATE queue_edges SET next_id = ?2 WHERE parent_id = ?1",
        params![parent, id_to_raw(next)],
    )
}

/// Delete an item and its outgoing edge. The edge goes first so the foreign
/// key on `parent_id` never dangles.
pub fn delete_item(conn: &Connection, id: ItemId) -> Result<usize, rusqlite::Error> {
    conn.execute("DELETE FROM queue_edges WHERE parent_id = ?1", params![id])?;
    conn.execute("DELETE FROM queue_items WHERE id = ?1", params![id])
}

/// Load an item together with its successor.
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<StoredItem>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "SELECT i.id, i.payload, e.next_id
         FROM queue_items i
         JOIN queue_edges e ON e.parent_id = i.id
         WHERE i.id = ?1",
    )?;

    stmt.query_row(params![id], |row| {
        let next: i64 = row.get(2)?;
        Ok(StoredItem {
            id: row.get(0)?,
            payload: row.get(1)?,
            next: id_from_raw(next),
        })
    })
    .optional()
}
