//! # Application State
//!
//! Shared state handed to every route handler through the `State`
//! extractor: the serialized ledger handle and the loaded configuration.
//!
//! ## Configuration
//!
//! | Variable                    | Default        | Meaning                              |
//! |-----------------------------|----------------|--------------------------------------|
//! | `PORT`                      | `8080`         | listen port                          |
//! | `AUTH_TOKEN`                | unset          | bearer secret; unset disables auth   |
//! | `SURETY_OWNER`              | required       | hex account allowed to pause         |
//! | `SURETY_MEMBERSHIP_FEE`     | `10` ether     | minimum initial funding, base units  |
//! | `SURETY_FOUNDING_THRESHOLD` | `4`            | airlines admitted without a vote     |
//! | `SURETY_LOG_JSON`           | `false`        | emit logs as JSON lines              |

use surety_core::{AccountId, Amount};
use surety_ledger::{Ledger, LedgerConfig, PayoutJournal, SharedLedger};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Service configuration.
///
/// Custom `Debug` redacts the auth token.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    pub ledger: LedgerConfig,
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("ledger", &self.ledger)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl AppConfig {
    /// Defaults for everything but the owner.
    pub fn new(owner: AccountId) -> Self {
        Self {
            port: 8080,
            auth_token: None,
            ledger: LedgerConfig::new(owner),
            log_json: false,
        }
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let owner_raw = lookup("SURETY_OWNER").ok_or(ConfigError::Missing("SURETY_OWNER"))?;
        let owner = AccountId::parse(&owner_raw).map_err(|e| ConfigError::Invalid {
            var: "SURETY_OWNER",
            reason: e.to_string(),
        })?;
        let mut config = Self::new(owner);

        if let Some(raw) = lookup("PORT") {
            config.port = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: "PORT",
                    reason: e.to_string(),
                }
            })?;
        }

        config.auth_token = lookup("AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(raw) = lookup("SURETY_MEMBERSHIP_FEE") {
            let fee = Amount::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: "SURETY_MEMBERSHIP_FEE",
                reason: e.to_string(),
            })?;
            config.ledger = config.ledger.with_membership_fee(fee);
        }

        if let Some(raw) = lookup("SURETY_FOUNDING_THRESHOLD") {
            let threshold: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: "SURETY_FOUNDING_THRESHOLD",
                    reason: e.to_string(),
                }
            })?;
            if threshold == 0 {
                return Err(ConfigError::Invalid {
                    var: "SURETY_FOUNDING_THRESHOLD",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.ledger = config.ledger.with_founding_threshold(threshold);
        }

        config.log_json = lookup("SURETY_LOG_JSON")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(config)
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ledger: SharedLedger<PayoutJournal>,
    pub config: AppConfig,
}

impl AppState {
    /// Fresh ledger built from `config`, paying out through an in-process journal.
    pub fn new(config: AppConfig) -> Self {
        let ledger = Ledger::new(config.ledger.clone(), PayoutJournal::new());
        Self {
            ledger: SharedLedger::new(ledger),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const OWNER: &str = "0x627306090abab3a6e1400e9345bc60c78a8bef57";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn owner_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SURETY_OWNER")));
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[("SURETY_OWNER", OWNER)])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.auth_token.is_none());
        assert_eq!(config.ledger.founding_threshold, 4);
        assert_eq!(config.ledger.membership_fee, Amount::ether(10));
        assert!(!config.log_json);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SURETY_OWNER", OWNER),
            ("PORT", "9090"),
            ("AUTH_TOKEN", "s3cret"),
            ("SURETY_MEMBERSHIP_FEE", "10"),
            ("SURETY_FOUNDING_THRESHOLD", "2"),
            ("SURETY_LOG_JSON", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.ledger.membership_fee, Amount::new(10));
        assert_eq!(config.ledger.founding_threshold, 2);
        assert!(config.log_json);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[("SURETY_OWNER", OWNER), ("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = AppConfig::from_lookup(lookup(&[
            ("SURETY_OWNER", OWNER),
            ("SURETY_FOUNDING_THRESHOLD", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SURETY_FOUNDING_THRESHOLD"));
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = AppConfig::new(AccountId::ZERO);
        config.auth_token = Some("super-secret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
