use stakehouse_core::StakehouseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GiveawayError>;

#[derive(Error, Debug)]
pub enum GiveawayError {
    #[error("Stakehouse core error: {0}")]
    Core(#[from] StakehouseError),

    #[error("Drawing not found: {0}")]
    DrawingNotFound(String),

    #[error("Drawing has already ended")]
    DrawingEnded,

    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("Stake must be a positive amount, got {0}")]
    InvalidStake(f64),

    #[error("Pot must be a non-negative amount, got {0}")]
    InvalidPot(f64),

    #[error("Unknown choice: '{0}' (expected \"under\" or \"over\")")]
    InvalidChoice(String),

    #[error("Unknown risk profile: '{0}' (expected \"low\" or \"high\")")]
    InvalidRisk(String),

    #[error("No double-down offer on drawing {0}")]
    DoubleDownNotFound(String),

    #[error("Only the drawing's winner may respond to the double-down offer")]
    WrongUser,

    #[error("Random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
