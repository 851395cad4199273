use std::path::Path;
use config::{Config, Environment, File, Source};
use crate::config::PollerConfig;
use crate::error::Result;

pub const ENV_PREFIX: &str = "PRICE_POLLER";

/// Command-line values that take precedence over every other layer.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub window_size: Option<usize>,
}

impl PollerConfig {
    /// Layers, lowest precedence first: built-in defaults, the optional
    /// config file, `PRICE_POLLER_*` environment variables, then `overrides`.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = path.map(|p| File::from(p).required(true));
        Self::load_from(file, overrides)
    }

    fn load_from<S>(file: Option<S>, overrides: &ConfigOverrides) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&PollerConfig::default())?);

        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        let config: PollerConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("poll_interval_secs", overrides.poll_interval_secs)?
            .set_override_option("window_size", overrides.window_size.map(|n| n as u64))?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn toml(s: &'static str) -> Option<impl Source + Send + Sync + 'static> {
        Some(File::from_str(s, FileFormat::Toml))
    }

    #[test]
    fn defaults_without_file() {
        let config = PollerConfig::load(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.poll_interval_secs, 12);
        assert_eq!(config.asset_id, "bitcoin");
    }

    #[test]
    fn file_values_override_defaults() {
        let config = PollerConfig::load_from(
            toml("poll_interval_secs = 30\nasset_id = \"ethereum\"\nasset_label = \"ETH\""),
            &ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.asset_id, "ethereum");
        assert_eq!(config.asset_label, "ETH");
        assert_eq!(config.backoff_cap_secs, 300);
    }

    #[test]
    fn cli_overrides_beat_file() {
        let overrides = ConfigOverrides {
            poll_interval_secs: Some(3),
            window_size: Some(4),
            ..ConfigOverrides::default()
        };
        let config = PollerConfig::load_from(toml("poll_interval_secs = 30"), &overrides).unwrap();
        assert_eq!(config.poll_interval_secs, 3);
        assert_eq!(config.window_size, 4);
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let result = PollerConfig::load_from(toml("window_size = 0"), &ConfigOverrides::default());
        assert!(result.is_err());
    }
}
