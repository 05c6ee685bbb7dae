//! Service configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::pricing::models::{MatchPolicy, PricingPolicy, UnknownMatchPolicy};

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Rules are read from `pricing_rules` when set.
    pub database_url: Option<String>,
    /// JSON rule file used when no database is configured.
    pub rules_file: Option<PathBuf>,
    /// Currency code shown in quotes
    pub currency: String,
    pub policy: PricingPolicy,
    pub rules_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            rules_file: None,
            currency: "PKR".to_string(),
            policy: PricingPolicy::default(),
            rules_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        let policy = PricingPolicy {
            weekday: parse_policy(get("PRICING_WEEKDAY_MATCH"), "PRICING_WEEKDAY_MATCH")?,
            off_peak: parse_policy(get("PRICING_OFF_PEAK_MATCH"), "PRICING_OFF_PEAK_MATCH")?,
        };

        let rules_cache_ttl = match get("RULES_CACHE_TTL_SECS") {
            Some(v) => {
                let secs: u64 = v.parse().map_err(|_| ConfigError::Invalid {
                    key: "RULES_CACHE_TTL_SECS",
                    message: format!("'{}' is not a number of seconds", v),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: "RULES_CACHE_TTL_SECS",
                        message: "must be positive".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.rules_cache_ttl,
        };

        Ok(Config {
            bind_addr,
            database_url: get("DATABASE_URL"),
            rules_file: get("PRICING_RULES_FILE").map(PathBuf::from),
            currency: get("CURRENCY").unwrap_or(defaults.currency),
            policy,
            rules_cache_ttl,
        })
    }
}

fn parse_policy(value: Option<String>, key: &'static str) -> Result<MatchPolicy, ConfigError> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|e: UnknownMatchPolicy| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
        None => Ok(MatchPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.currency, "PKR");
        assert!(config.database_url.is_none());
        assert_eq!(config.policy, PricingPolicy::default());
        assert_eq!(config.rules_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/grounds"),
            ("PRICING_RULES_FILE", "config/pricing_rules.json"),
            ("CURRENCY", "USD"),
            ("PRICING_OFF_PEAK_MATCH", "cumulative"),
            ("RULES_CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/grounds"));
        assert_eq!(config.rules_file, Some(PathBuf::from("config/pricing_rules.json")));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.policy.weekday, MatchPolicy::FirstMatch);
        assert_eq!(config.policy.off_peak, MatchPolicy::Cumulative);
        assert_eq!(config.rules_cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  "), ("CURRENCY", "")])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.currency, "PKR");
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("PRICING_WEEKDAY_MATCH", "best")])).unwrap_err();
        assert!(err.to_string().contains("PRICING_WEEKDAY_MATCH"));
        assert!(err.to_string().contains("unknown match policy 'best'"));

        assert!(Config::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RULES_CACHE_TTL_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RULES_CACHE_TTL_SECS", "soon")])).is_err());
    }
}
