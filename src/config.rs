//! Router configuration.
//!
//! Capacities and timeouts for the routing core. Values can be supplied
//! directly, or loaded from the environment (`.env` supported) with
//! `TEAMBOT_*` variables.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed confidence score assigned to cascade-rule hits.
pub const CASCADE_SCORE: f32 = 0.95;

/// Configuration for the `Router` and its owned components.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RouterConfig {
    /// Maximum number of message ids held by the dedup cache.
    #[validate(range(min = 1))]
    pub dedup_capacity: usize,
    /// Number of most-recent ids retained when the cache overflows.
    /// Must be strictly smaller than `dedup_capacity`.
    #[validate(range(min = 1))]
    pub dedup_retain: usize,
    /// Seconds of owner inactivity after which a wizard session expires.
    /// `0` disables the timeout.
    pub wizard_timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            dedup_capacity: 100,
            dedup_retain: 80,
            wizard_timeout_secs: 300,
        }
    }
}

impl RouterConfig {
    /// Loads the configuration from the environment, falling back to
    /// defaults for unset variables. Reads a `.env` file when present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            dedup_capacity: read_var("TEAMBOT_DEDUP_CAPACITY", defaults.dedup_capacity)?,
            dedup_retain: read_var("TEAMBOT_DEDUP_RETAIN", defaults.dedup_retain)?,
            wizard_timeout_secs: read_var(
                "TEAMBOT_WIZARD_TIMEOUT_SECS",
                defaults.wizard_timeout_secs,
            )?,
        };
        config.validated()?;
        Ok(config)
    }

    /// Runs field validation plus the cross-field retain/capacity check.
    pub fn validated(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.dedup_retain >= self.dedup_capacity {
            return Err(AppError::Config(format!(
                "dedup_retain ({}) must be smaller than dedup_capacity ({})",
                self.dedup_retain, self.dedup_capacity
            )));
        }
        Ok(())
    }
}

fn read_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RouterConfig::default();
        assert!(config.validated().is_ok());
        assert_eq!(config.dedup_capacity, 100);
        assert_eq!(config.dedup_retain, 80);
    }

    #[test]
    fn test_retain_must_be_below_capacity() {
        let config = RouterConfig {
            dedup_capacity: 50,
            dedup_retain: 50,
            ..Default::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("TEAMBOT_DEDUP_CAPACITY", Some("200")),
                ("TEAMBOT_DEDUP_RETAIN", Some("150")),
                ("TEAMBOT_WIZARD_TIMEOUT_SECS", Some("60")),
            ],
            || {
                let config = RouterConfig::from_env().expect("env config should parse");
                assert_eq!(config.dedup_capacity, 200);
                assert_eq!(config.dedup_retain, 150);
                assert_eq!(config.wizard_timeout_secs, 60);
            },
        );
    }

    #[test]
    fn test_env_rejects_garbage() {
        temp_env::with_vars([("TEAMBOT_DEDUP_CAPACITY", Some("lots"))], || {
            assert!(RouterConfig::from_env().is_err());
        });
    }
}
