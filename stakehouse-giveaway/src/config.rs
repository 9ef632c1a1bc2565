use crate::entry::RiskProfile;
use crate::error::{GiveawayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const FALLBACK_POT_SHARE_PERCENT: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fractional operator margin applied to the fair-odds multiplier.
    pub house_edge: f64,

    /// Starting pot when a drawing is created without one.
    pub default_pot: f64,

    /// Pot-share percent per risk profile name.
    pub risk_shares: HashMap<String, f64>,

    /// How long a resolved winner has to respond to the double-down offer.
    pub double_down_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut risk_shares = HashMap::new();
        risk_shares.insert("low".to_string(), 30.0);
        risk_shares.insert("high".to_string(), 70.0);

        Self {
            house_edge: 0.02,
            default_pot: 100.0,
            risk_shares,
            double_down_window: Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.house_edge.is_finite() || !(0.0..1.0).contains(&self.house_edge) {
            return Err(GiveawayError::Config(format!(
                "house_edge must be in [0, 1), got {}",
                self.house_edge
            )));
        }

        if !self.default_pot.is_finite() || self.default_pot < 0.0 {
            return Err(GiveawayError::Config(format!(
                "default_pot must be non-negative, got {}",
                self.default_pot
            )));
        }

        for (name, share) in &self.risk_shares {
            if !share.is_finite() || !(0.0..=100.0).contains(share) {
                return Err(GiveawayError::Config(format!(
                    "pot share for profile '{}' must be in [0, 100], got {}",
                    name, share
                )));
            }
        }

        Ok(())
    }

    /// Pot-share percent for a profile; profiles missing from the table fall
    /// back to the "low" share.
    pub fn pot_share_percent(&self, profile: &RiskProfile) -> f64 {
        self.risk_shares
            .get(profile.as_str())
            .or_else(|| self.risk_shares.get("low"))
            .copied()
            .unwrap_or(FALLBACK_POT_SHARE_PERCENT)
    }
}
