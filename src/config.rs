use crate::{
    reveal::{
        DEFAULT_TICK,
        MAX_TICK,
        MIN_TICK,
    },
    wager::{
        DEFAULT_HOUSE_EDGE,
        TableLimits,
    },
};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STARTING_BALANCE: f64 = 100.0;
pub const DEFAULT_REVEAL_DURATION: Duration = Duration::from_millis(1000);
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
pub const DEFAULT_TARGET_MULTIPLIER: f64 = 2.0;
pub const MAX_OUTCOME_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub starting_balance: f64,
    pub reveal_duration: Duration,
    pub tick: Duration,
    /// `None` keeps every round.
    pub history_capacity: Option<usize>,
    /// `None` waits for the outcome push indefinitely.
    pub outcome_timeout: Option<Duration>,
    pub default_target_multiplier: f64,
    pub username: String,
    pub connection_id: String,
    pub house_edge: f64,
    pub limits: TableLimits,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            reveal_duration: DEFAULT_REVEAL_DURATION,
            tick: DEFAULT_TICK,
            history_capacity: Some(DEFAULT_HISTORY_CAPACITY),
            outcome_timeout: None,
            default_target_multiplier: DEFAULT_TARGET_MULTIPLIER,
            username: String::from("player"),
            connection_id: uuid::Uuid::new_v4().to_string(),
            house_edge: DEFAULT_HOUSE_EDGE,
            limits: TableLimits::default(),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("starting balance must be a finite, non-negative amount")]
    StartingBalance,
    #[error("tick interval must be between 1ms and 60s")]
    Tick,
    #[error("history capacity must be at least 1, or unset to keep every round")]
    HistoryCapacity,
    #[error("outcome timeout must be non-zero and at most one day")]
    OutcomeTimeout,
    #[error("house edge must be in [0, 1)")]
    HouseEdge,
    #[error("default target multiplier must be at least 1.00")]
    TargetMultiplier,
    #[error("username must not be empty")]
    Username,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ConfigError::StartingBalance);
        }
        if !(MIN_TICK..=MAX_TICK).contains(&self.tick) {
            return Err(ConfigError::Tick);
        }
        if self.history_capacity == Some(0) {
            return Err(ConfigError::HistoryCapacity);
        }
        if let Some(timeout) = self.outcome_timeout
            && (timeout.is_zero() || timeout > MAX_OUTCOME_TIMEOUT)
        {
            return Err(ConfigError::OutcomeTimeout);
        }
        if !(0.0..1.0).contains(&self.house_edge) {
            return Err(ConfigError::HouseEdge);
        }
        if !(self.default_target_multiplier >= 1.0) {
            return Err(ConfigError::TargetMultiplier);
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Username);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn validate__accepts_defaults() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate__accepts_unbounded_history_and_bounded_timeout() {
        let config = GameConfig {
            history_capacity: None,
            outcome_timeout: Some(Duration::from_secs(30)),
            ..GameConfig::default()
        };

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate__rejects_out_of_range_values() {
        let cases = [
            (
                GameConfig {
                    starting_balance: f64::NAN,
                    ..GameConfig::default()
                },
                ConfigError::StartingBalance,
            ),
            (
                GameConfig {
                    tick: Duration::ZERO,
                    ..GameConfig::default()
                },
                ConfigError::Tick,
            ),
            (
                GameConfig {
                    tick: Duration::from_secs(u64::MAX),
                    ..GameConfig::default()
                },
                ConfigError::Tick,
            ),
            (
                GameConfig {
                    history_capacity: Some(0),
                    ..GameConfig::default()
                },
                ConfigError::HistoryCapacity,
            ),
            (
                GameConfig {
                    outcome_timeout: Some(Duration::from_secs(u64::MAX)),
                    ..GameConfig::default()
                },
                ConfigError::OutcomeTimeout,
            ),
            (
                GameConfig {
                    house_edge: 1.0,
                    ..GameConfig::default()
                },
                ConfigError::HouseEdge,
            ),
            (
                GameConfig {
                    default_target_multiplier: 0.5,
                    ..GameConfig::default()
                },
                ConfigError::TargetMultiplier,
            ),
            (
                GameConfig {
                    username: "  ".into(),
                    ..GameConfig::default()
                },
                ConfigError::Username,
            ),
        ];

        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }
}
