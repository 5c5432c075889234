use super::error::StoreResult;
use super::schema::FRAME_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::prepare_database;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Handle to the frames database.
///
/// All access goes through [`read`](Self::read) or [`transaction`](Self::transaction),
/// which hold the connection lock for the duration of the closure. A transaction
/// commits only when the closure returns `Ok`; any error rolls back every write
/// made inside it.
#[derive(Clone)]
pub struct SqliteFrameStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFrameStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open frames database")?;
        if is_new_db {
            info!("Creating new frames database at {:?}", path);
        }
        prepare_database(&mut conn, FRAME_VERSIONED_SCHEMAS, is_new_db, "frames")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        prepare_database(&mut conn, FRAME_VERSIONED_SCHEMAS, true, "frames")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    pub fn transaction<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
