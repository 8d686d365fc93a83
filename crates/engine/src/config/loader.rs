use std::path::Path;

use tcsim_core::ParameterError;
use thiserror::Error;

use super::types::{EngineConfig, FeedMode};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Invalid default parameters: {0}")]
    Defaults(#[from] ParameterError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Load engine configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<EngineConfig, ConfigError> {
    let default_config = include_str!("engine_config.json");
    load_config_from_str(default_config)
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;
        if feed.exchange.trim().is_empty() {
            return Err(invalid("feed.exchange", "must not be empty"));
        }
        if feed.symbol.trim().is_empty() {
            return Err(invalid("feed.symbol", "must not be empty"));
        }
        if feed.event_capacity == 0 {
            return Err(invalid("feed.event_capacity", "must be at least 1"));
        }
        match feed.mode {
            FeedMode::Synthetic => {
                if feed.synthetic_interval_ms == 0 {
                    return Err(invalid("feed.synthetic_interval_ms", "must be at least 1"));
                }
                if !positive(feed.synthetic_base_price) {
                    return Err(invalid("feed.synthetic_base_price", "must be positive"));
                }
            }
            FeedMode::Websocket => {
                if !(feed.ws_url.starts_with("ws://") || feed.ws_url.starts_with("wss://")) {
                    return Err(invalid(
                        "feed.ws_url",
                        format!("{:?} is not a ws:// or wss:// URL", feed.ws_url),
                    ));
                }
                if feed.ws_url.starts_with("wss://") && !cfg!(feature = "tls") {
                    return Err(invalid(
                        "feed.ws_url",
                        "wss:// needs a build with the `tls` feature",
                    ));
                }
            }
        }

        let reconnect = &self.reconnect;
        if !(reconnect.base_delay_ms.is_finite() && reconnect.base_delay_ms >= 0.0) {
            return Err(invalid("reconnect.base_delay_ms", "must be a non-negative number"));
        }
        if !(reconnect.growth_factor.is_finite() && reconnect.growth_factor >= 1.0) {
            return Err(invalid("reconnect.growth_factor", "must be >= 1"));
        }

        let depth = &self.depth;
        if !(positive(depth.base_threshold) && depth.base_threshold < 1.0) {
            return Err(invalid("depth.base_threshold", "must be in (0, 1)"));
        }
        if !(depth.sensitivity.is_finite() && depth.sensitivity >= 0.0) {
            return Err(invalid("depth.sensitivity", "must be non-negative"));
        }
        if !unit(depth.damping_cap) {
            return Err(invalid("depth.damping_cap", "must be in [0, 1]"));
        }

        let cost = &self.cost;
        if !positive(cost.slippage_epsilon) {
            return Err(invalid("cost.slippage_epsilon", "must be positive"));
        }
        if !positive(cost.slippage_scale) {
            return Err(invalid("cost.slippage_scale", "must be positive"));
        }
        if !positive(cost.time_horizon) {
            return Err(invalid("cost.time_horizon", "must be positive"));
        }
        if !unit(cost.taker_cap) {
            return Err(invalid("cost.taker_cap", "must be in [0, 1]"));
        }
        if !(unit(cost.ratio_floor) && unit(cost.ratio_ceiling) && cost.ratio_floor <= cost.ratio_ceiling)
        {
            return Err(invalid(
                "cost.ratio_floor",
                "floor and ceiling must satisfy 0 <= floor <= ceiling <= 1",
            ));
        }

        if !positive(self.limits.max_volatility) {
            return Err(invalid("limits.max_volatility", "must be positive"));
        }
        if self.estimate_capacity == 0 {
            return Err(invalid("estimate_capacity", "must be at least 1"));
        }

        self.defaults.validate(&self.limits)?;
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcsim_core::FeeTier;

    #[test]
    fn test_load_default_config() {
        let config = load_default_config().unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.feed.mode, FeedMode::Synthetic);
        assert_eq!(config.feed.exchange, "OKX");
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.base_delay_ms, 1000.0);
        assert_eq!(config.reconnect.growth_factor, 1.5);
        assert_eq!(config.limits.max_volatility, 0.5);
        assert_eq!(config.defaults.quantity, 100.0);
        assert_eq!(config.defaults.fee_tier, FeeTier::Standard);
    }

    #[test]
    fn test_embedded_matches_code_defaults() {
        let mut embedded = load_default_config().unwrap();
        embedded.feed.synthetic_seed = None;
        assert_eq!(embedded, EngineConfig::default());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = load_config_from_str(
            r#"{"feed": {"mode": "websocket", "ws_url": "ws://localhost:9000/book"},
                "reconnect": {"max_attempts": 2}}"#,
        )
        .unwrap();

        assert_eq!(config.feed.mode, FeedMode::Websocket);
        assert_eq!(config.feed.symbol, "BTC-USDT-SWAP");
        assert_eq!(config.reconnect.max_attempts, 2);
        assert_eq!(config.reconnect.growth_factor, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EngineConfig::default();
        config.feed.mode = FeedMode::Websocket;
        config.feed.ws_url = "http://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "feed.ws_url", .. })
        ));

        let mut config = EngineConfig::default();
        config.depth.damping_cap = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "depth.damping_cap", .. })
        ));

        let mut config = EngineConfig::default();
        config.cost.ratio_floor = 0.9;
        config.cost.ratio_ceiling = 0.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.defaults.volatility = 0.8;
        assert!(matches!(config.validate(), Err(ConfigError::Defaults(_))));
    }

    #[test]
    fn test_wss_requires_tls_build() {
        let config = load_config_from_str(r#"{"feed": {"mode": "websocket"}}"#).unwrap();
        assert!(config.feed.ws_url.starts_with("wss://"));

        let result = config.validate();
        if cfg!(feature = "tls") {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(ConfigError::Invalid { field: "feed.ws_url", .. })
            ));
        }

        // Synthetic mode never opens the URL
        let synthetic = load_config_from_str(r#"{"feed": {"mode": "synthetic"}}"#).unwrap();
        assert!(synthetic.validate().is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            load_config_from_str("{not json"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            load_config_from_str(r#"{"feed": {"mode": "carrier-pigeon"}}"#),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            load_config("/definitely/not/here.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
