use thiserror::Error;

pub type Result<T> = std::result::Result<T, StakehouseError>;

#[derive(Error, Debug)]
pub enum StakehouseError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Random source error: {0}")]
    RandomSource(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StakehouseError {
    pub fn random_source(msg: impl Into<String>) -> Self {
        Self::RandomSource(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// conversion from reqwest::Error
impl From<reqwest::Error> for StakehouseError {
    fn from(err: reqwest::Error) -> Self {
        StakehouseError::RandomSource(err.to_string())
    }
}
