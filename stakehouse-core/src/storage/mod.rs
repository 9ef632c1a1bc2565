pub mod drawing_store;

pub use drawing_store::{DrawingRow, DrawingStore};

use crate::error::{Result, StakehouseError};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StakehouseError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    /// In-memory database, used by tests and ephemeral deployments.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema_sync()?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        Self::create_tables(&conn)
    }

    fn init_schema_sync(&self) -> Result<()> {
        let conn = self
            .conn
            .try_lock()
            .map_err(|_| StakehouseError::internal("connection busy during init"))?;
        Self::create_tables(&conn)
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        // Drawings table; each row holds one serialized drawing aggregate
        conn.execute(
            "CREATE TABLE IF NOT EXISTS drawings (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
