//! Fire-once timers for the drawing lifecycle.
//!
//! Timers are never cancelled. Every handler re-reads persisted state and
//! checks its guard (`ended`, sub-game still pending) before mutating, so a
//! late or duplicate firing is a safe no-op.

use crate::engine::GiveawayEngine;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Arm the end-of-drawing timer. At the deadline the drawing resolves
/// through the same path a forced end takes.
pub fn arm_resolution(engine: Arc<GiveawayEngine>, drawing_id: String, at: DateTime<Utc>) {
    tokio::spawn(async move {
        sleep_until(at).await;
        match engine.resolve(&drawing_id).await {
            Ok(outcome) => {
                tracing::debug!("Drawing {} end timer fired: {}", drawing_id, outcome)
            }
            Err(e) => tracing::warn!("Drawing {} end timer failed: {}", drawing_id, e),
        }
    });
}

/// Arm the double-down deadline timer.
pub fn arm_double_down_timeout(
    engine: Arc<GiveawayEngine>,
    drawing_id: String,
    at: DateTime<Utc>,
) {
    tokio::spawn(async move {
        sleep_until(at).await;
        match engine.double_down_timeout(&drawing_id).await {
            Ok(outcome) => tracing::debug!(
                "Drawing {} double-down timer fired: {}",
                drawing_id,
                outcome
            ),
            Err(e) => {
                tracing::warn!("Drawing {} double-down timer failed: {}", drawing_id, e)
            }
        }
    });
}

/// Re-arm timers from persisted state after a restart. Overdue deadlines
/// fire immediately through the normal guarded handlers.
pub async fn restore(engine: &Arc<GiveawayEngine>) -> Result<usize> {
    let mut armed = 0;

    for drawing in engine.list_drawings().await? {
        if !drawing.ended {
            arm_resolution(Arc::clone(engine), drawing.id.clone(), drawing.ends_at);
            armed += 1;
        } else if let Some(dd) = &drawing.double_down {
            if dd.is_pending() {
                arm_double_down_timeout(Arc::clone(engine), drawing.id.clone(), dd.deadline);
                armed += 1;
            }
        }
    }

    if armed > 0 {
        tracing::info!("Restored {} timer(s) from saved state", armed);
    }
    Ok(armed)
}

async fn sleep_until(at: DateTime<Utc>) {
    let delay = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::doubledown::{DoubleDown, DoubleDownState};
    use crate::drawing::{Drawing, Winner};
    use crate::entry::{Choice, Entry, RiskProfile};
    use crate::notify::NullNotifier;
    use crate::payout;
    use crate::store::{MemoryStateStore, StateStore};
    use stakehouse_core::{ScriptedSource, UserRef};

    fn engine_over(
        store: Arc<MemoryStateStore>,
        values: impl IntoIterator<Item = i64>,
        config: EngineConfig,
    ) -> Arc<GiveawayEngine> {
        Arc::new(
            GiveawayEngine::new(
                store,
                Arc::new(ScriptedSource::new(values)),
                Arc::new(NullNotifier),
                config,
            )
            .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_timer_resolves_the_drawing() {
        let store = Arc::new(MemoryStateStore::new());
        let engine = engine_over(store, [80], EngineConfig::default());

        let id = engine
            .create_drawing(
                "prize",
                UserRef::from("creator"),
                None,
                Some(100.0),
                Utc::now() + chrono::Duration::seconds(1),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(engine.get_drawing(&id).await.unwrap().ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_winner_resolution_arms_the_double_down_deadline() {
        let store = Arc::new(MemoryStateStore::new());
        let config = EngineConfig {
            double_down_window: Duration::from_secs(2),
            ..Default::default()
        };
        let engine = engine_over(store, [50], config);

        let id = engine
            .create_drawing(
                "prize",
                UserRef::from("creator"),
                None,
                Some(1000.0),
                Utc::now() + chrono::Duration::seconds(1),
            )
            .await
            .unwrap();
        engine
            .submit_entry(
                &id,
                UserRef::from("u1"),
                "u1",
                50,
                0,
                None,
                "under",
                "low",
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;

        let drawing = engine.get_drawing(&id).await.unwrap();
        assert!(drawing.ended);
        assert_eq!(
            drawing.double_down.as_ref().unwrap().state,
            DoubleDownState::Declined
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_rearms_an_overdue_drawing() {
        let store = Arc::new(MemoryStateStore::new());

        // drawing persisted by a previous run, already past its deadline
        let drawing = Drawing::new(
            "prize",
            UserRef::from("creator"),
            None,
            100.0,
            Utc::now() - chrono::Duration::minutes(5),
        );
        let id = drawing.id.clone();
        store.save(&[drawing]).await.unwrap();

        let engine = engine_over(store, [80], EngineConfig::default());
        let armed = restore(&engine).await.unwrap();
        assert_eq!(armed, 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(engine.get_drawing(&id).await.unwrap().ended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_rearms_a_pending_double_down() {
        let store = Arc::new(MemoryStateStore::new());

        let entry = Entry::new(
            UserRef::from("u1"),
            "u1",
            50,
            0,
            None,
            Choice::Under,
            RiskProfile::Low,
        )
        .unwrap();
        let breakdown = payout::compute(&entry, 100.0, &EngineConfig::default());

        let mut drawing = Drawing::new(
            "prize",
            UserRef::from("creator"),
            None,
            100.0,
            Utc::now() - chrono::Duration::hours(7),
        );
        drawing.ended = true;
        drawing.roll = Some(50);
        drawing.double_down = Some(DoubleDown::offer(
            entry.user.clone(),
            Utc::now() - chrono::Duration::minutes(1),
        ));
        drawing.winner = Some(Winner {
            payout: breakdown.total,
            breakdown,
            entry,
        });
        let id = drawing.id.clone();
        store.save(&[drawing]).await.unwrap();

        let engine = engine_over(store, [], EngineConfig::default());
        let armed = restore(&engine).await.unwrap();
        assert_eq!(armed, 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let drawing = engine.get_drawing(&id).await.unwrap();
        assert_eq!(
            drawing.double_down.as_ref().unwrap().state,
            DoubleDownState::Declined
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_leaves_settled_drawings_alone() {
        let store = Arc::new(MemoryStateStore::new());

        let mut drawing = Drawing::new(
            "prize",
            UserRef::from("creator"),
            None,
            100.0,
            Utc::now() - chrono::Duration::hours(1),
        );
        drawing.ended = true;
        drawing.result = Some("no winner".to_string());
        store.save(&[drawing]).await.unwrap();

        let engine = engine_over(store, [], EngineConfig::default());
        assert_eq!(restore(&engine).await.unwrap(), 0);
    }
}
