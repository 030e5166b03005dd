//! Configuration types for distributed Game of Life runs.

use serde::{Deserialize, Serialize};

fn default_workers() -> usize {
    1
}

/// How rows left over by `rows mod workers` are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// The last rank absorbs every remainder row.
    #[default]
    LastAbsorbs,
    /// Remainder rows go one at a time to the earliest ranks.
    Spread,
}

/// Ordering of sends and receives during halo exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStrategy {
    /// Two parity-ordered phases; safe on rendezvous channels.
    #[default]
    Phased,
    /// Send both boundary rows, then receive both halos. Requires a buffered
    /// transport.
    Eager,
}

/// Delivery semantics of point-to-point channels between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// A send blocks until the peer receives.
    #[default]
    Rendezvous,
    /// Sends complete immediately; messages queue at the receiver.
    Buffered,
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of cooperating workers (rank 0 is the coordinator).
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Number of generations to simulate.
    #[serde(default)]
    pub generations: u64,
    /// Remainder row distribution.
    #[serde(default)]
    pub remainder: RemainderPolicy,
    /// Halo exchange ordering.
    #[serde(default)]
    pub exchange: ExchangeStrategy,
    /// Channel semantics.
    #[serde(default)]
    pub transport: Transport,
    /// Gather and log the full grid after every generation.
    #[serde(default)]
    pub trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            generations: 0,
            remainder: RemainderPolicy::default(),
            exchange: ExchangeStrategy::default(),
            transport: Transport::default(),
            trace: false,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration parameters.
    ///
    /// Worker count is checked against the grid by the partitioner, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange == ExchangeStrategy::Eager && self.transport == Transport::Rendezvous {
            return Err(ConfigError::UnsafeExchange);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Eager halo exchange deadlocks on rendezvous transport; use phased exchange or buffered transport")]
    UnsafeExchange,
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
