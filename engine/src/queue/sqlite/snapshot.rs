//! SQLite online backup.

use rusqlite::backup::Backup;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Pages copied per backup step
const PAGES_PER_STEP: std::os::raw::c_int = 100;
const STEP_PAUSE: Duration = Duration::from_millis(10);

/// Create a backup file using SQLite's backup API.
pub fn create_backup(conn: &Connection, backup_path: &Path) -> Result<(), rusqlite::Error> {
    let mut backup_conn = Connection::open(backup_path)?;
    let backup = Backup::new(conn, &mut backup_conn)?;
    backup.run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)?;
    info!(path = ?backup_path, "Backup created");
    Ok(())
}

