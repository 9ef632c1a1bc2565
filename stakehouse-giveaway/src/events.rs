use serde::{Deserialize, Serialize};
use stakehouse_core::UserRef;

/// Externally triggered engine events.
///
/// Transports decode their own encodings (button ids, API routes, timer
/// callbacks) into these variants; the engine dispatches on the variant
/// alone and never sees the transport encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GiveawayEvent {
    /// End a drawing now, ahead of or at its deadline.
    EndDrawing { drawing_id: String },

    /// The winner responded to the double-down offer.
    DoubleDownResponse {
        drawing_id: String,
        user: UserRef,
        accept: bool,
    },

    /// The double-down deadline passed without a response.
    DoubleDownTimeout { drawing_id: String },
}

impl GiveawayEvent {
    pub fn drawing_id(&self) -> &str {
        match self {
            GiveawayEvent::EndDrawing { drawing_id }
            | GiveawayEvent::DoubleDownResponse { drawing_id, .. }
            | GiveawayEvent::DoubleDownTimeout { drawing_id } => drawing_id,
        }
    }
}
