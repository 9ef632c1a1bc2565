use crate::config::EngineConfig;
use crate::entry::{Choice, Entry};
use serde::{Deserialize, Serialize};

/// Payout owed to a winning entry, broken into its components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub probability: f64,
    pub multiplier: f64,
    /// Odds-based component, funded by the house.
    pub base_win: f64,
    /// Pot-funded component; the only part that depletes the drawing's pot.
    pub pot_share: f64,
    pub total: f64,
}

/// Truncate toward zero to 2 decimal places of the pot's currency.
fn trunc2(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

/// Win probability of a guess, clamped away from zero.
pub fn win_probability(main: u8, choice: Choice) -> f64 {
    let raw = match choice {
        Choice::Under => (main as f64 + 1.0) / 101.0,
        Choice::Over => (101.0 - main as f64) / 101.0,
    };
    raw.max(1.0 / 101.0)
}

/// Compute the payout a winning entry is owed against the drawing's pot.
///
/// Pure in its inputs; the caller deducts `pot_share` from the pot exactly
/// once when resolution commits.
pub fn compute(entry: &Entry, pot: f64, config: &EngineConfig) -> Payout {
    let probability = win_probability(entry.main, entry.choice);
    let multiplier = (1.0 / probability) * (1.0 - config.house_edge);
    let base_win = trunc2(entry.stake * multiplier);
    let pot_share = (pot * config.pot_share_percent(&entry.risk) / 100.0).floor();

    Payout {
        probability,
        multiplier,
        base_win,
        pot_share,
        total: base_win + pot_share,
    }
}
