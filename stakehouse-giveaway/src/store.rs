use crate::drawing::Drawing;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use stakehouse_core::{DrawingRow, DrawingStore, Storage};
use std::sync::Arc;

/// Whole-collection persistence contract.
///
/// The backing representation is the entire set of drawings, so a save
/// replaces everything. Callers must serialize their load-mutate-save
/// cycles; the engine does this with a store-level lock.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Drawing>>;
    async fn save(&self, drawings: &[Drawing]) -> Result<()>;
}

/// State store persisting each drawing as a serialized row in SQLite.
pub struct SqliteStateStore {
    storage: Arc<Storage>,
}

impl SqliteStateStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self) -> Result<Vec<Drawing>> {
        let rows = DrawingStore::new(&self.storage).load_all().await?;

        let mut drawings = Vec::with_capacity(rows.len());
        for row in rows {
            drawings.push(serde_json::from_str(&row.data)?);
        }
        Ok(drawings)
    }

    async fn save(&self, drawings: &[Drawing]) -> Result<()> {
        let mut rows = Vec::with_capacity(drawings.len());
        for drawing in drawings {
            rows.push(DrawingRow {
                id: drawing.id.clone(),
                data: serde_json::to_string(drawing)?,
                updated_at: Utc::now(),
            });
        }

        DrawingStore::new(&self.storage).replace_all(&rows).await?;
        Ok(())
    }
}

/// In-memory state store for tests and ephemeral embedding.
#[derive(Default)]
pub struct MemoryStateStore {
    drawings: Mutex<Vec<Drawing>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Vec<Drawing>> {
        Ok(self.drawings.lock().clone())
    }

    async fn save(&self, drawings: &[Drawing]) -> Result<()> {
        *self.drawings.lock() = drawings.to_vec();
        Ok(())
    }
}
