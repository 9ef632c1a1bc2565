use crate::doubledown::DoubleDown;
use crate::entry::Entry;
use crate::error::{GiveawayError, Result};
use crate::payout::Payout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stakehouse_core::{ChannelRef, MessageRef, UserRef};
use std::sync::atomic::{AtomicI64, Ordering};

/// Resolved winner together with the payout it was awarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub entry: Entry,
    pub breakdown: Payout,
    /// Current total owed to the winner; double-down outcomes adjust it.
    pub payout: f64,
}

/// One timed round accepting entries and resolving to a winner or no-winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    pub id: String,
    pub prize: String,
    pub creator: UserRef,
    pub channel: Option<ChannelRef>,
    pub message: Option<MessageRef>,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub pot: f64,
    pub entries: Vec<Entry>,
    pub ended: bool,
    pub roll: Option<u8>,
    pub winner: Option<Winner>,
    /// Diagnostic note: "no winner", or the error that halted resolution.
    pub result: Option<String>,
    pub double_down: Option<DoubleDown>,
}

static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Creation-time-derived identifier. Strictly monotonic within the process:
/// two drawings created in the same millisecond get distinct ids.
pub fn next_drawing_id(now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    loop {
        let last = LAST_ID_MILLIS.load(Ordering::Acquire);
        if candidate <= last {
            candidate = last + 1;
        }
        if LAST_ID_MILLIS
            .compare_exchange(last, candidate, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return candidate.to_string();
        }
    }
}

impl Drawing {
    pub fn new(
        prize: impl Into<String>,
        creator: UserRef,
        channel: Option<ChannelRef>,
        pot: f64,
        ends_at: DateTime<Utc>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: next_drawing_id(created_at),
            prize: prize.into(),
            creator,
            channel,
            message: None,
            created_at,
            ends_at,
            pot,
            entries: Vec::new(),
            ended: false,
            roll: None,
            winner: None,
            result: None,
            double_down: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.ended
    }

    /// Append an entry. Entries are append-only and close with the drawing.
    pub fn push_entry(&mut self, entry: Entry) -> Result<()> {
        if self.ended {
            return Err(GiveawayError::DrawingEnded);
        }
        self.entries.push(entry);
        Ok(())
    }
}
