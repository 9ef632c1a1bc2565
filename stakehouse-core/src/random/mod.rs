use crate::error::{Result, StakehouseError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;

const RANDOM_ORG_URL: &str = "https://www.random.org";

/// Source of uniformly distributed integers.
///
/// Every randomness point in the engine (the resolution roll, tie-break
/// draws, the double-down flip) goes through this seam, so deployments can
/// swap the external service for a local or scripted source.
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// Draw one uniform integer in the inclusive range `[min, max]`.
    async fn random_int(&self, min: i64, max: i64) -> Result<i64>;
}

/// Client for the random.org plain-text integers endpoint.
pub struct RandomOrgSource {
    client: reqwest::Client,
    base_url: String,
}

impl RandomOrgSource {
    pub fn new() -> Self {
        Self::with_base_url(RANDOM_ORG_URL)
    }

    /// Base URL override, used to point at a stub server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for RandomOrgSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RandomSource for RandomOrgSource {
    async fn random_int(&self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(StakehouseError::random_source(format!(
                "empty range [{}, {}]",
                min, max
            )));
        }

        let url = format!(
            "{}/integers/?num=1&min={}&max={}&col=1&base=10&format=plain&rnd=new",
            self.base_url, min, max
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(StakehouseError::random_source(format!(
                "service returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let value: i64 = body.trim().parse().map_err(|_| {
            StakehouseError::random_source(format!("unparseable response: {:?}", body))
        })?;

        if value < min || value > max {
            return Err(StakehouseError::random_source(format!(
                "value {} outside [{}, {}]",
                value, min, max
            )));
        }

        Ok(value)
    }
}

/// Process-local RNG source for deployments without the external service.
pub struct LocalSource;

#[async_trait]
impl RandomSource for LocalSource {
    async fn random_int(&self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(StakehouseError::random_source(format!(
                "empty range [{}, {}]",
                min, max
            )));
        }

        Ok(rand::thread_rng().gen_range(min..=max))
    }
}

/// Deterministic source that replays a fixed script of values.
///
/// Fails once the script is exhausted, which doubles as a way to exercise
/// the engine's degraded-randomness paths.
pub struct ScriptedSource {
    values: Mutex<VecDeque<i64>>,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }

    /// Source that fails on the first draw.
    pub fn empty() -> Self {
        Self::new([])
    }

    pub fn push(&self, value: i64) {
        self.values.lock().push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.lock().len()
    }
}

#[async_trait]
impl RandomSource for ScriptedSource {
    async fn random_int(&self, min: i64, max: i64) -> Result<i64> {
        let value = self
            .values
            .lock()
            .pop_front()
            .ok_or_else(|| StakehouseError::random_source("script exhausted"))?;

        if value < min || value > max {
            return Err(StakehouseError::random_source(format!(
                "scripted value {} outside [{}, {}]",
                value, min, max
            )));
        }

        Ok(value)
    }
}
