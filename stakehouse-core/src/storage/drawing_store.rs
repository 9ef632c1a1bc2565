use crate::error::Result;
use crate::storage::Storage;
use chrono::Utc;
use rusqlite::params;

/// One serialized drawing as persisted in the `drawings` table.
#[derive(Debug, Clone)]
pub struct DrawingRow {
    pub id: String,
    pub data: String,
    pub updated_at: chrono::DateTime<Utc>,
}

pub struct DrawingStore<'a> {
    storage: &'a Storage,
}

impl<'a> DrawingStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Rewrite the whole collection in one transaction.
    ///
    /// The engine treats the collection as a single aggregate, so every save
    /// replaces everything that was there before.
    pub async fn replace_all(&self, rows: &[DrawingRow]) -> Result<()> {
        let mut conn = self.storage.get_connection().await;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM drawings", [])?;
        for row in rows {
            tx.execute(
                "INSERT INTO drawings (id, data, updated_at) VALUES (?1, ?2, ?3)",
                params![row.id, row.data, row.updated_at.timestamp()],
            )?;
        }
        tx.commit()?;

        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<DrawingRow>> {
        let conn = self.storage.get_connection().await;

        let mut stmt =
            conn.prepare("SELECT id, data, updated_at FROM drawings ORDER BY id ASC")?;

        let row_iter = stmt.query_map([], |row| {
            Ok(DrawingRow {
                id: row.get(0)?,
                data: row.get(1)?,
                updated_at: chrono::DateTime::from_timestamp(row.get(2)?, 0)
                    .unwrap_or_else(Utc::now),
            })
        })?;

        let mut rows = Vec::new();
        for row in row_iter {
            rows.push(row?);
        }

        Ok(rows)
    }
}
