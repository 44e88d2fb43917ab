use rusqlite::Connection;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::ServerError;

// Thread-local connection slot, remembered with the file it was opened on.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = const { RefCell::new(None) };
}

#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provides the calling worker's connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let stale = !matches!(slot.as_ref(), Some((p, _)) if *p == self.path);
                if stale {
                    let conn = Connection::open(&self.path)?;
                    *slot = Some((self.path.clone(), conn));
                }
                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(ServerError::InternalError),
                }
            })
            .map_err(|_| ServerError::InternalError)?
    }
}

/// Initialize database from a SQL schema file
pub fn init_db(db: &Database, schema_path: &Path) -> Result<(), ServerError> {
    let schema_sql = fs::read_to_string(schema_path)?;

    db.with_conn(|conn| {
        conn.execute_batch(&schema_sql)?;
        Ok(())
    })?;

    info!("Database initialized from {}", schema_path.display());
    Ok(())
}

/// Load demo listings, but only into an empty table.
pub fn seed_db(db: &Database, seed_path: &Path) -> Result<bool, ServerError> {
    let existing: i64 = db.with_conn(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM listings", [], |r| r.get(0))?)
    })?;
    if existing > 0 {
        return Ok(false);
    }

    let seed_sql = fs::read_to_string(seed_path)?;
    db.with_conn(|conn| {
        conn.execute_batch(&seed_sql)?;
        Ok(())
    })?;

    info!("Seeded demo listings from {}", seed_path.display());
    Ok(true)
}
