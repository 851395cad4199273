use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub mod loader;

pub const DEFAULT_ENDPOINT: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd&include_last_updated_at=true";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PollerConfig {
    pub endpoint: String,
    /// Top-level key of the asset object in the response body.
    pub asset_id: String,
    /// Key of the price inside the asset object.
    pub quote_currency: String,
    pub asset_label: String,
    pub quote_label: String,
    pub poll_interval_secs: u64,
    pub rate_limit_cooldown_secs: u64,
    pub backoff_base_secs: u64,
    pub backoff_cap_secs: u64,
    pub window_size: usize,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    /// Emit a diagnostic every this many consecutive server errors.
    pub diagnostic_every: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            asset_id: "bitcoin".to_string(),
            quote_currency: "usd".to_string(),
            asset_label: "BTC".to_string(),
            quote_label: "USD".to_string(),
            poll_interval_secs: 12,
            rate_limit_cooldown_secs: 60,
            backoff_base_secs: 1,
            backoff_cap_secs: 300,
            window_size: 10,
            request_timeout_secs: 5,
            shutdown_grace_secs: 5,
            diagnostic_every: 5,
        }
    }
}

impl PollerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }

    pub fn backoff_cap(&self) -> Duration {
        Duration::from_secs(self.backoff_cap_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;

        if self.asset_id.is_empty() || self.quote_currency.is_empty() {
            return Err(Error::ConfigError("asset_id and quote_currency must be set".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::ConfigError("poll_interval_secs must be positive".into()));
        }
        if self.rate_limit_cooldown_secs == 0 {
            return Err(Error::ConfigError("rate_limit_cooldown_secs must be positive".into()));
        }
        if self.backoff_base_secs == 0 {
            return Err(Error::ConfigError("backoff_base_secs must be positive".into()));
        }
        if self.backoff_cap_secs < self.backoff_base_secs {
            return Err(Error::ConfigError(format!(
                "backoff_cap_secs ({}) is below backoff_base_secs ({})",
                self.backoff_cap_secs, self.backoff_base_secs
            )));
        }
        if self.window_size == 0 {
            return Err(Error::ConfigError("window_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::ConfigError("request_timeout_secs must be positive".into()));
        }
        if self.diagnostic_every == 0 {
            return Err(Error::ConfigError("diagnostic_every must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PollerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(12));
        assert_eq!(config.rate_limit_cooldown(), Duration::from_secs(60));
        assert_eq!(config.backoff_cap(), Duration::from_secs(300));
        assert_eq!(config.window_size, 10);
    }

    #[test]
    fn rejects_cap_below_base() {
        let config = PollerConfig {
            backoff_base_secs: 10,
            backoff_cap_secs: 5,
            ..PollerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn rejects_empty_window() {
        let config = PollerConfig { window_size: 0, ..PollerConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_endpoint() {
        let config = PollerConfig { endpoint: "not a url".into(), ..PollerConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidEndpoint(_))));
    }
}
