use crate::config::EngineConfig;
use crate::doubledown::{DoubleDown, DoubleDownState};
use crate::drawing::{Drawing, Winner};
use crate::entry::{Choice, Entry, RiskProfile};
use crate::error::{GiveawayError, Result};
use crate::events::GiveawayEvent;
use crate::notify::Notifier;
use crate::scheduler;
use crate::store::StateStore;
use crate::{payout, selection};
use chrono::{DateTime, Utc};
use stakehouse_core::{ChannelRef, MessageRef, RandomSource, UserRef};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// The drawing was already ended; nothing changed.
    AlreadyEnded,
    NoWinner,
    Winner(Winner),
}

impl fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveOutcome::AlreadyEnded => write!(f, "drawing has already ended"),
            ResolveOutcome::NoWinner => write!(f, "no winner"),
            ResolveOutcome::Winner(winner) => write!(
                f,
                "{} wins {:.2}",
                winner.entry.display_name, winner.payout
            ),
        }
    }
}

/// Outcome of a double-down response or timeout.
#[derive(Debug, Clone, PartialEq)]
pub enum DoubleDownOutcome {
    /// The sub-game had already settled; nothing changed.
    NoLongerAvailable,
    Declined,
    Won { payout: f64 },
    Lost { payout: f64, returned: f64 },
}

impl fmt::Display for DoubleDownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoubleDownOutcome::NoLongerAvailable => {
                write!(f, "double-down offer is no longer available")
            }
            DoubleDownOutcome::Declined => write!(f, "double-down declined"),
            DoubleDownOutcome::Won { payout } => {
                write!(f, "double-down won, payout now {:.2}", payout)
            }
            DoubleDownOutcome::Lost { payout, returned } => write!(
                f,
                "double-down lost, {:.0} returned to the pot, payout now {:.2}",
                returned, payout
            ),
        }
    }
}

/// The giveaway resolution engine.
///
/// Owns the drawing lifecycle end to end: creation, entry collection,
/// deadline resolution, payout, and the double-down sub-game. Logical
/// operations are serialized per drawing; every load-mutate-save cycle is
/// additionally serialized at the store level because the backing
/// representation is the whole collection.
pub struct GiveawayEngine {
    store: Arc<dyn StateStore>,
    random: Arc<dyn RandomSource>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
    drawing_locks: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    store_lock: tokio::sync::Mutex<()>,
}

impl GiveawayEngine {
    pub fn new(
        store: Arc<dyn StateStore>,
        random: Arc<dyn RandomSource>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            random,
            notifier,
            config,
            drawing_locks: parking_lot::Mutex::new(HashMap::new()),
            store_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn drawing_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.drawing_locks.lock();
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// One load-mutate-save cycle under the store-level lock. Nothing is
    /// saved when the mutation fails, so a failed operation commits nothing.
    async fn with_drawing<T>(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut Drawing) -> Result<T>,
    ) -> Result<T> {
        let _write = self.store_lock.lock().await;

        let mut drawings = self.store.load().await?;
        let drawing = drawings
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| GiveawayError::DrawingNotFound(id.to_string()))?;

        let out = mutate(drawing)?;
        self.store.save(&drawings).await?;
        Ok(out)
    }

    pub async fn get_drawing(&self, id: &str) -> Result<Drawing> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| GiveawayError::DrawingNotFound(id.to_string()))
    }

    pub async fn list_drawings(&self) -> Result<Vec<Drawing>> {
        self.store.load().await
    }

    /// Create a drawing and arm its end-of-drawing timer.
    pub async fn create_drawing(
        self: &Arc<Self>,
        prize: &str,
        creator: UserRef,
        channel: Option<ChannelRef>,
        pot: Option<f64>,
        ends_at: DateTime<Utc>,
    ) -> Result<String> {
        let pot = pot.unwrap_or(self.config.default_pot);
        if !pot.is_finite() || pot < 0.0 {
            return Err(GiveawayError::InvalidPot(pot));
        }

        let drawing = Drawing::new(prize, creator, channel, pot, ends_at);
        let id = drawing.id.clone();

        {
            let _write = self.store_lock.lock().await;
            let mut drawings = self.store.load().await?;
            drawings.push(drawing);
            self.store.save(&drawings).await?;
        }

        tracing::info!("Created drawing {} ending at {}", id, ends_at);
        scheduler::arm_resolution(Arc::clone(self), id.clone(), ends_at);
        Ok(id)
    }

    /// Record the announcement message once a collaborator has posted it.
    pub async fn attach_message(&self, id: &str, message: MessageRef) -> Result<()> {
        let lock = self.drawing_lock(id);
        let _guard = lock.lock().await;

        self.with_drawing(id, |drawing| {
            drawing.message = Some(message);
            Ok(())
        })
        .await
    }

    /// Submit an entry. Choice and risk arrive as transport strings and are
    /// validated here along with the numeric ranges.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_entry(
        &self,
        id: &str,
        user: UserRef,
        display_name: &str,
        main: i64,
        tiebreak: i64,
        stake: Option<f64>,
        choice: &str,
        risk: &str,
    ) -> Result<()> {
        let choice: Choice = choice.parse()?;
        let risk: RiskProfile = risk.parse()?;
        let entry = Entry::new(user, display_name, main, tiebreak, stake, choice, risk)?;

        let lock = self.drawing_lock(id);
        let _guard = lock.lock().await;

        let user = entry.user.clone();
        self.with_drawing(id, |drawing| drawing.push_entry(entry)).await?;

        tracing::info!("Drawing {}: entry recorded for {}", id, user);
        Ok(())
    }

    /// Resolve a drawing: fetch the roll, pick the winner, apply the payout,
    /// and arm the double-down deadline.
    ///
    /// Safe against duplicate invocation (timer racing a forced end): later
    /// calls observe the ended flag and change nothing. A failed roll fetch
    /// records a diagnostic and leaves the drawing resolvable on retry.
    pub async fn resolve(self: &Arc<Self>, id: &str) -> Result<ResolveOutcome> {
        let lock = self.drawing_lock(id);
        let _guard = lock.lock().await;

        let snapshot = self.get_drawing(id).await?;
        if snapshot.ended {
            return Ok(ResolveOutcome::AlreadyEnded);
        }

        let roll = match self.random.random_int(0, 100).await {
            Ok(value) => value as u8,
            Err(e) => {
                let note = format!("resolution halted, random source unavailable: {}", e);
                self.with_drawing(id, |drawing| {
                    drawing.result = Some(note.clone());
                    Ok(())
                })
                .await?;
                return Err(GiveawayError::RandomUnavailable(e.to_string()));
            }
        };

        let winner_index =
            selection::select_winner(roll, &snapshot.entries, self.random.as_ref()).await;

        let config = self.config.clone();
        let (outcome, committed) = self
            .with_drawing(id, move |drawing| {
                if drawing.ended {
                    return Ok((ResolveOutcome::AlreadyEnded, drawing.clone()));
                }

                drawing.ended = true;
                drawing.roll = Some(roll);

                let outcome = match winner_index {
                    None => {
                        drawing.result = Some("no winner".to_string());
                        ResolveOutcome::NoWinner
                    }
                    Some(index) => {
                        let entry = drawing.entries[index].clone();
                        let breakdown = payout::compute(&entry, drawing.pot, &config);
                        drawing.pot = (drawing.pot - breakdown.pot_share).max(0.0);

                        let deadline = Utc::now()
                            + chrono::Duration::from_std(config.double_down_window)
                                .unwrap_or_else(|_| chrono::Duration::hours(6));
                        drawing.double_down =
                            Some(DoubleDown::offer(entry.user.clone(), deadline));

                        let winner = Winner {
                            payout: breakdown.total,
                            breakdown,
                            entry,
                        };
                        drawing.winner = Some(winner.clone());
                        drawing.result = None;
                        ResolveOutcome::Winner(winner)
                    }
                };

                Ok((outcome, drawing.clone()))
            })
            .await?;

        match &outcome {
            ResolveOutcome::AlreadyEnded => {}
            ResolveOutcome::NoWinner => {
                tracing::info!("Drawing {} resolved with roll {}: no winner", id, roll);
                if let Err(e) = self.notifier.no_winner(&committed).await {
                    tracing::warn!("No-winner notification for drawing {} failed: {}", id, e);
                }
            }
            ResolveOutcome::Winner(winner) => {
                tracing::info!(
                    "Drawing {} resolved with roll {}: {} wins {:.2}",
                    id,
                    roll,
                    winner.entry.user,
                    winner.payout
                );
                if let Err(e) = self.notifier.resolution(&committed).await {
                    tracing::warn!("Resolution notification for drawing {} failed: {}", id, e);
                }
                if let Some(dd) = &committed.double_down {
                    scheduler::arm_double_down_timeout(
                        Arc::clone(self),
                        id.to_string(),
                        dd.deadline,
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// End a drawing ahead of its deadline. Authorization is the caller's
    /// concern; the engine only guarantees idempotence against the timer.
    pub async fn force_resolve(self: &Arc<Self>, id: &str) -> Result<ResolveOutcome> {
        self.resolve(id).await
    }

    /// The winner's answer to the double-down offer.
    pub async fn respond_double_down(
        &self,
        id: &str,
        user: &UserRef,
        accept: bool,
    ) -> Result<DoubleDownOutcome> {
        let lock = self.drawing_lock(id);
        let _guard = lock.lock().await;

        let snapshot = self.get_drawing(id).await?;
        let offer = snapshot
            .double_down
            .as_ref()
            .ok_or_else(|| GiveawayError::DoubleDownNotFound(id.to_string()))?;

        if &offer.user != user {
            return Err(GiveawayError::WrongUser);
        }
        if !offer.is_pending() {
            return Ok(DoubleDownOutcome::NoLongerAvailable);
        }

        if !accept {
            return self
                .settle_double_down(id, DoubleDownState::Declined, None)
                .await;
        }

        let flip = match self.random.random_int(0, 100).await {
            Ok(value) => value,
            Err(e) => {
                let note = format!("double-down halted, random source unavailable: {}", e);
                self.with_drawing(id, |drawing| {
                    drawing.result = Some(note.clone());
                    Ok(())
                })
                .await?;
                return Err(GiveawayError::RandomUnavailable(e.to_string()));
            }
        };

        let outcome = if flip >= 50 {
            DoubleDownState::Won
        } else {
            DoubleDownState::Lost
        };
        self.settle_double_down(id, outcome, Some(flip)).await
    }

    /// Deadline handler: declines the offer only if it is still pending, so
    /// a decision the user already made is never clobbered.
    pub async fn double_down_timeout(&self, id: &str) -> Result<DoubleDownOutcome> {
        let lock = self.drawing_lock(id);
        let _guard = lock.lock().await;

        let snapshot = self.get_drawing(id).await?;
        match snapshot.double_down {
            Some(ref offer) if offer.is_pending() => {}
            _ => return Ok(DoubleDownOutcome::NoLongerAvailable),
        }

        tracing::info!("Drawing {}: double-down window expired", id);
        self.settle_double_down(id, DoubleDownState::Declined, None)
            .await
    }

    /// Commit a double-down transition and apply its payout/pot movement.
    /// Caller holds the per-drawing lock; the pending guard is re-checked
    /// under the store lock.
    async fn settle_double_down(
        &self,
        id: &str,
        target: DoubleDownState,
        flip: Option<i64>,
    ) -> Result<DoubleDownOutcome> {
        let (outcome, committed) = self
            .with_drawing(id, |drawing| {
                let dd = drawing
                    .double_down
                    .as_mut()
                    .ok_or_else(|| GiveawayError::DoubleDownNotFound(drawing.id.clone()))?;

                if !dd.settle(target) {
                    return Ok((DoubleDownOutcome::NoLongerAvailable, drawing.clone()));
                }

                let outcome = match target {
                    DoubleDownState::Declined => DoubleDownOutcome::Declined,
                    DoubleDownState::Won => {
                        let winner = drawing.winner.as_mut().ok_or_else(|| {
                            GiveawayError::Internal("double-down without winner".to_string())
                        })?;
                        winner.payout += drawing.pot;
                        drawing.pot = 0.0;
                        DoubleDownOutcome::Won {
                            payout: winner.payout,
                        }
                    }
                    DoubleDownState::Lost => {
                        let winner = drawing.winner.as_mut().ok_or_else(|| {
                            GiveawayError::Internal("double-down without winner".to_string())
                        })?;
                        let returned = winner.breakdown.base_win.floor();
                        winner.payout = (winner.payout - returned).max(0.0);
                        drawing.pot += returned;
                        DoubleDownOutcome::Lost {
                            payout: winner.payout,
                            returned,
                        }
                    }
                    DoubleDownState::Pending => {
                        return Err(GiveawayError::Internal(
                            "cannot settle back to pending".to_string(),
                        ))
                    }
                };

                Ok((outcome, drawing.clone()))
            })
            .await?;

        if outcome != DoubleDownOutcome::NoLongerAvailable {
            match flip {
                Some(flip) => tracing::info!(
                    "Drawing {}: double-down flip {} -> {}",
                    id,
                    flip,
                    outcome
                ),
                None => tracing::info!("Drawing {}: {}", id, outcome),
            }
            if let Err(e) = self.notifier.double_down_outcome(&committed).await {
                tracing::warn!(
                    "Double-down notification for drawing {} failed: {}",
                    id,
                    e
                );
            }
        }

        Ok(outcome)
    }

    /// Dispatch an externally triggered event and return the human-readable
    /// outcome line for the transport to display.
    pub async fn handle_event(self: &Arc<Self>, event: GiveawayEvent) -> Result<String> {
        match event {
            GiveawayEvent::EndDrawing { drawing_id } => {
                Ok(self.force_resolve(&drawing_id).await?.to_string())
            }
            GiveawayEvent::DoubleDownResponse {
                drawing_id,
                user,
                accept,
            } => Ok(self
                .respond_double_down(&drawing_id, &user, accept)
                .await?
                .to_string()),
            GiveawayEvent::DoubleDownTimeout { drawing_id } => {
                Ok(self.double_down_timeout(&drawing_id).await?.to_string())
            }
        }
    }
}
