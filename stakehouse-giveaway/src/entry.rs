use crate::error::{GiveawayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stakehouse_core::UserRef;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STAKE: f64 = 1.0;

/// Which side of the roll a guess covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Under,
    Over,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Under => "under",
            Choice::Over => "over",
        }
    }
}

impl FromStr for Choice {
    type Err = GiveawayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "under" => Ok(Choice::Under),
            "over" => Ok(Choice::Over),
            _ => Err(GiveawayError::InvalidChoice(s.to_string())),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much of the shared pot the entrant is playing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Low,
    High,
}

impl RiskProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Low => "low",
            RiskProfile::High => "high",
        }
    }
}

impl FromStr for RiskProfile {
    type Err = GiveawayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskProfile::Low),
            "high" => Ok(RiskProfile::High),
            _ => Err(GiveawayError::InvalidRisk(s.to_string())),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One participant's wager within a drawing. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub user: UserRef,
    pub display_name: String,
    pub main: u8,
    pub tiebreak: u8,
    pub stake: f64,
    pub choice: Choice,
    pub risk: RiskProfile,
    pub joined_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        user: UserRef,
        display_name: impl Into<String>,
        main: i64,
        tiebreak: i64,
        stake: Option<f64>,
        choice: Choice,
        risk: RiskProfile,
    ) -> Result<Self> {
        if !(0..=100).contains(&main) {
            return Err(GiveawayError::OutOfRange {
                field: "guess",
                value: main,
            });
        }

        if !(0..=100).contains(&tiebreak) {
            return Err(GiveawayError::OutOfRange {
                field: "tiebreak",
                value: tiebreak,
            });
        }

        let stake = stake.unwrap_or(DEFAULT_STAKE);
        if !stake.is_finite() || stake <= 0.0 {
            return Err(GiveawayError::InvalidStake(stake));
        }

        Ok(Self {
            user,
            display_name: display_name.into(),
            main: main as u8,
            tiebreak: tiebreak as u8,
            stake,
            choice,
            risk,
            joined_at: Utc::now(),
        })
    }

    /// Candidate predicate: whether this entry's guess covers `roll`.
    pub fn covers(&self, roll: u8) -> bool {
        match self.choice {
            Choice::Under => roll <= self.main,
            Choice::Over => roll >= self.main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(main: i64, choice: Choice) -> Entry {
        Entry::new(
            UserRef::from("u1"),
            "Player One",
            main,
            50,
            None,
            choice,
            RiskProfile::Low,
        )
        .unwrap()
    }

    #[test]
    fn test_parses_choice_and_risk_strings() {
        assert_eq!("under".parse::<Choice>().unwrap(), Choice::Under);
        assert_eq!("OVER".parse::<Choice>().unwrap(), Choice::Over);
        assert!("between".parse::<Choice>().is_err());

        assert_eq!("low".parse::<RiskProfile>().unwrap(), RiskProfile::Low);
        assert_eq!(" High ".parse::<RiskProfile>().unwrap(), RiskProfile::High);
        assert!("yolo".parse::<RiskProfile>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_guesses() {
        let out = Entry::new(
            UserRef::from("u1"),
            "x",
            101,
            0,
            None,
            Choice::Under,
            RiskProfile::Low,
        );
        assert!(matches!(
            out,
            Err(GiveawayError::OutOfRange { field: "guess", .. })
        ));

        let out = Entry::new(
            UserRef::from("u1"),
            "x",
            0,
            -1,
            None,
            Choice::Under,
            RiskProfile::Low,
        );
        assert!(matches!(
            out,
            Err(GiveawayError::OutOfRange {
                field: "tiebreak",
                ..
            })
        ));
    }

    #[test]
    fn test_stake_defaults_to_one_and_must_be_positive() {
        let e = entry(50, Choice::Under);
        assert_eq!(e.stake, DEFAULT_STAKE);

        let out = Entry::new(
            UserRef::from("u1"),
            "x",
            50,
            50,
            Some(0.0),
            Choice::Under,
            RiskProfile::Low,
        );
        assert!(matches!(out, Err(GiveawayError::InvalidStake(_))));
    }

    #[test]
    fn test_covers_matches_the_candidate_predicate() {
        // an "under" guess equal to the roll is a candidate; one below is not
        assert!(entry(50, Choice::Under).covers(50));
        assert!(!entry(49, Choice::Under).covers(50));
        assert!(entry(100, Choice::Under).covers(0));

        assert!(entry(50, Choice::Over).covers(50));
        assert!(!entry(51, Choice::Over).covers(50));
        assert!(entry(0, Choice::Over).covers(100));
    }
}
