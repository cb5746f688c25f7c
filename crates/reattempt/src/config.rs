//! Configuration for retry controllers

use crate::error::ConfigError;
use crate::retry::Backoff;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Environment variable holding the maximum attempt count.
pub const ENV_MAX_ATTEMPTS: &str = "REATTEMPT_MAX_ATTEMPTS";
/// Environment variable selecting the backoff strategy.
pub const ENV_STRATEGY: &str = "REATTEMPT_STRATEGY";
/// Environment variable holding the initial delay in seconds.
pub const ENV_INITIAL_DELAY: &str = "REATTEMPT_INITIAL_DELAY";
/// Environment variable holding the linear delta in seconds.
pub const ENV_DELTA: &str = "REATTEMPT_DELTA";
/// Environment variable holding the exponential base.
pub const ENV_EXPONENT_BASE: &str = "REATTEMPT_EXPONENT_BASE";

const DEFAULT_EXPONENT_BASE: i32 = 2;

/// Configuration for a retry sequence.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// document only needs to name what it changes:
///
/// ```rust
/// use reattempt::config::RetryConfig;
/// use reattempt::retry::Backoff;
///
/// let config: RetryConfig = toml::from_str(r#"
///     max_attempts = 4
///
///     [backoff]
///     strategy = "linear"
///     initial_delay = 0.5
///     delta = 1.0
/// "#).unwrap();
///
/// assert_eq!(config.max_attempts, Some(4));
/// assert_eq!(config.backoff, Backoff::linear(0.5, 1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, `None` to retry until success
    pub max_attempts: Option<u32>,

    /// Delay schedule between attempts
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Retry until success.
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Set the backoff schedule.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `REATTEMPT_MAX_ATTEMPTS` for the attempt limit (`unbounded` or empty for none)
    /// - `REATTEMPT_STRATEGY` for the backoff strategy (`linear` or `exponential`)
    /// - `REATTEMPT_INITIAL_DELAY` for the first retry delay (in seconds)
    /// - `REATTEMPT_DELTA` for the linear step (in seconds, defaults to the initial delay)
    /// - `REATTEMPT_EXPONENT_BASE` for the exponential base
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ENV_MAX_ATTEMPTS) {
            config.max_attempts = parse_max_attempts(&raw)?;
        }

        let strategy = match env::var(ENV_STRATEGY) {
            Ok(name) => name.trim().to_ascii_lowercase(),
            Err(_) => match config.backoff {
                Backoff::Linear { .. } => "linear".to_string(),
                Backoff::Exponential { .. } => "exponential".to_string(),
            },
        };

        let initial_delay = parse_var::<f64>(ENV_INITIAL_DELAY)?.unwrap_or(match config.backoff {
            Backoff::Linear { initial_delay, .. } | Backoff::Exponential { initial_delay, .. } => {
                initial_delay
            }
        });

        config.backoff = match strategy.as_str() {
            "linear" => {
                let delta = parse_var::<f64>(ENV_DELTA)?.unwrap_or(initial_delay);
                Backoff::linear(initial_delay, delta)
            }
            "exponential" => {
                let base = parse_var::<i32>(ENV_EXPONENT_BASE)?.unwrap_or(match config.backoff {
                    Backoff::Exponential { exponent_base, .. } => exponent_base,
                    Backoff::Linear { .. } => DEFAULT_EXPONENT_BASE,
                });
                Backoff::exponential(initial_delay, base)
            }
            _ => return Err(ConfigError::UnknownStrategy(strategy)),
        };

        Ok(config)
    }
}

fn parse_max_attempts(raw: &str) -> Result<Option<u32>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unbounded") {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|e| invalid(ENV_MAX_ATTEMPTS, raw, e))
}

fn parse_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(var, &raw, e)),
        Err(_) => Ok(None),
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 5] = [
        ENV_MAX_ATTEMPTS,
        ENV_STRATEGY,
        ENV_INITIAL_DELAY,
        ENV_DELTA,
        ENV_EXPONENT_BASE,
    ];

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let mut kvs: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|v| (*v, None)).collect();
        for (key, value) in vars {
            kvs.retain(|(k, _)| k != key);
            kvs.push((*key, Some(*value)));
        }
        temp_env::with_vars(kvs, f)
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.backoff, Backoff::exponential(5.0, 2));
    }

    #[test]
    fn test_builder_methods() {
        let config = RetryConfig::default()
            .with_max_attempts(3)
            .with_backoff(Backoff::linear(1.0, 0.5));
        assert_eq!(config.max_attempts, Some(3));
        assert_eq!(config.backoff, Backoff::linear(1.0, 0.5));

        assert_eq!(config.unbounded().max_attempts, None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RetryConfig = toml::from_str("max_attempts = 2").unwrap();
        assert_eq!(config.max_attempts, Some(2));
        assert_eq!(config.backoff, Backoff::default());

        let config: RetryConfig = toml::from_str("").unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = RetryConfig::default()
            .with_max_attempts(5)
            .with_backoff(Backoff::exponential(0.1, 3));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_env_unset_is_default() {
        let config = with_env(&[], RetryConfig::from_env).unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn test_from_env_linear() {
        let config = with_env(
            &[
                (ENV_MAX_ATTEMPTS, "4"),
                (ENV_STRATEGY, "Linear"),
                (ENV_INITIAL_DELAY, "0.5"),
                (ENV_DELTA, "2"),
            ],
            RetryConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.max_attempts, Some(4));
        assert_eq!(config.backoff, Backoff::linear(0.5, 2.0));
    }

    #[test]
    fn test_from_env_linear_delta_defaults_to_initial_delay() {
        let config = with_env(
            &[(ENV_STRATEGY, "linear"), (ENV_INITIAL_DELAY, "3")],
            RetryConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.backoff, Backoff::linear(3.0, 3.0));
    }

    #[test]
    fn test_from_env_exponential_overrides() {
        let config = with_env(
            &[
                (ENV_MAX_ATTEMPTS, "unbounded"),
                (ENV_INITIAL_DELAY, "0.25"),
                (ENV_EXPONENT_BASE, "3"),
            ],
            RetryConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.backoff, Backoff::exponential(0.25, 3));
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        let err = with_env(&[(ENV_MAX_ATTEMPTS, "many")], RetryConfig::from_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: ENV_MAX_ATTEMPTS, .. }
        ));

        let err = with_env(&[(ENV_INITIAL_DELAY, "soon")], RetryConfig::from_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: ENV_INITIAL_DELAY, .. }
        ));

        let err = with_env(&[(ENV_STRATEGY, "fibonacci")], RetryConfig::from_env).unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("fibonacci".to_string()));
    }
}
