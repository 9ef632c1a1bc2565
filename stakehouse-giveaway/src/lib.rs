//! Giveaway resolution engine
//!
//! Timed, wager-style drawings: participants guess a number with a stake,
//! the drawing resolves at its deadline against a roll from a trusted random
//! source, a multi-stage tie-break picks the winner, and the payout combines
//! fair odds, house edge, and a shared pot. A resolved winner may double
//! down on a secondary deadline-bound sub-game.

pub mod config;
pub mod doubledown;
pub mod drawing;
pub mod engine;
pub mod entry;
pub mod error;
pub mod events;
pub mod notify;
pub mod payout;
pub mod scheduler;
pub mod selection;
pub mod store;

pub use config::EngineConfig;
pub use doubledown::{DoubleDown, DoubleDownState};
pub use drawing::{Drawing, Winner};
pub use engine::{DoubleDownOutcome, GiveawayEngine, ResolveOutcome};
pub use entry::{Choice, Entry, RiskProfile};
pub use error::{GiveawayError, Result};
pub use events::GiveawayEvent;
pub use notify::{Notifier, NullNotifier};
pub use payout::Payout;
pub use store::{MemoryStateStore, SqliteStateStore, StateStore};

use stakehouse_core::{RandomSource, Storage};
use std::path::Path;
use std::sync::Arc;

/// Open an engine over a SQLite-backed state store at `db_path` and re-arm
/// timers for anything the previous run left unresolved.
pub async fn open(
    db_path: &Path,
    random: Arc<dyn RandomSource>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
) -> Result<Arc<GiveawayEngine>> {
    let storage = Arc::new(Storage::new(db_path).await?);
    let store = Arc::new(SqliteStateStore::new(storage));
    let engine = Arc::new(GiveawayEngine::new(store, random, notifier, config)?);
    scheduler::restore(&engine).await?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stakehouse_core::{ScriptedSource, UserRef};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_reloads_saved_drawings() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("stakehouse.db");

        let id = {
            let engine = open(
                &db_path,
                Arc::new(ScriptedSource::empty()),
                Arc::new(NullNotifier),
                EngineConfig::default(),
            )
            .await
            .unwrap();

            engine
                .create_drawing(
                    "50 coins",
                    UserRef::from("creator"),
                    None,
                    None,
                    Utc::now() + chrono::Duration::hours(1),
                )
                .await
                .unwrap()
        };

        let engine = open(
            &db_path,
            Arc::new(ScriptedSource::empty()),
            Arc::new(NullNotifier),
            EngineConfig::default(),
        )
        .await
        .unwrap();

        let drawing = engine.get_drawing(&id).await.unwrap();
        assert!(drawing.is_open());
        assert_eq!(drawing.pot, engine.config().default_pot);
    }
}
