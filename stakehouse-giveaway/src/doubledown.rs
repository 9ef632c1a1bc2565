use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stakehouse_core::UserRef;

/// Lifecycle of the double-or-nothing offer made to a resolved winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleDownState {
    Pending,
    /// Declined explicitly, or timed out at the deadline.
    Declined,
    Won,
    Lost,
}

/// Double-down sub-game attached to a resolved drawing's winner.
///
/// Leaves `Pending` exactly once; later transition attempts are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleDown {
    pub state: DoubleDownState,
    pub deadline: DateTime<Utc>,
    /// The winning user; the only one allowed to respond.
    pub user: UserRef,
}

impl DoubleDown {
    pub fn offer(user: UserRef, deadline: DateTime<Utc>) -> Self {
        Self {
            state: DoubleDownState::Pending,
            deadline,
            user,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == DoubleDownState::Pending
    }

    /// Move out of `Pending`. Returns false when the sub-game was already
    /// settled (or the target is `Pending` itself), leaving state untouched.
    pub fn settle(&mut self, outcome: DoubleDownState) -> bool {
        if self.state != DoubleDownState::Pending || outcome == DoubleDownState::Pending {
            return false;
        }
        self.state = outcome;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> DoubleDown {
        DoubleDown::offer(UserRef::from("winner"), Utc::now())
    }

    #[test]
    fn test_settles_exactly_once() {
        let mut dd = offer();
        assert!(dd.is_pending());

        assert!(dd.settle(DoubleDownState::Won));
        assert_eq!(dd.state, DoubleDownState::Won);

        assert!(!dd.settle(DoubleDownState::Declined));
        assert!(!dd.settle(DoubleDownState::Lost));
        assert_eq!(dd.state, DoubleDownState::Won);
    }

    #[test]
    fn test_cannot_settle_back_to_pending() {
        let mut dd = offer();
        assert!(!dd.settle(DoubleDownState::Pending));
        assert!(dd.is_pending());
    }
}
