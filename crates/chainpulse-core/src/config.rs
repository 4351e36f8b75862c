//! Process configuration read from environment variables.
//!
//! # Environment Variables
//!
//! | Setting | Primary Env Var | Fallback Env Var | Default |
//! |---------|-----------------|------------------|---------|
//! | Node provider key | `CHAINPULSE_ALCHEMY_API_KEY` | `ALCHEMY_API_KEY` | none (fallback mode) |
//! | RPC base URL | `CHAINPULSE_RPC_URL` | - | `https://eth-mainnet.g.alchemy.com/v2` |
//! | Chain id | `CHAINPULSE_CHAIN_ID` | - | `1` |
//! | Request timeout | `CHAINPULSE_TIMEOUT_MS` | - | `3000` |
//! | Chain stats interval | `CHAINPULSE_CHAIN_INTERVAL_SECS` | - | `30` |
//! | Feed interval | `CHAINPULSE_FEED_INTERVAL_SECS` | - | `300` |
//! | WalletConnect project | `CHAINPULSE_WALLETCONNECT_PROJECT_ID` | `WALLETCONNECT_PROJECT_ID` | none |
//!
//! A missing API key is not an error: every RPC-backed source runs in
//! permanent fallback mode and a warning is logged once.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_RPC_URL: &str = "https://eth-mainnet.g.alchemy.com/v2";
pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_CHAIN_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(300);

/// Immutable settings, constructed once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub rpc_url: String,
    pub chain_id: u64,
    pub request_timeout: Duration,
    pub chain_interval: Duration,
    pub feed_interval: Duration,
    pub walletconnect_project_id: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("request_timeout", &self.request_timeout)
            .field("chain_interval", &self.chain_interval)
            .field("feed_interval", &self.feed_interval)
            .field("walletconnect_project_id", &self.walletconnect_project_id)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            rpc_url: String::from(DEFAULT_RPC_URL),
            chain_id: DEFAULT_CHAIN_ID,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            chain_interval: DEFAULT_CHAIN_INTERVAL,
            feed_interval: DEFAULT_FEED_INTERVAL,
            walletconnect_project_id: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(&lookup))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self {
            api_key: read("CHAINPULSE_ALCHEMY_API_KEY", Some("ALCHEMY_API_KEY")),
            walletconnect_project_id: read(
                "CHAINPULSE_WALLETCONNECT_PROJECT_ID",
                Some("WALLETCONNECT_PROJECT_ID"),
            ),
            ..Self::default()
        };

        if let Some(url) = read("CHAINPULSE_RPC_URL", None) {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidRpcUrl { value: url });
            }
            settings.rpc_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = read("CHAINPULSE_CHAIN_ID", None) {
            settings.chain_id = parse_positive("CHAINPULSE_CHAIN_ID", &raw)?;
        }
        if let Some(raw) = read("CHAINPULSE_TIMEOUT_MS", None) {
            settings.request_timeout =
                Duration::from_millis(parse_positive("CHAINPULSE_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = read("CHAINPULSE_CHAIN_INTERVAL_SECS", None) {
            settings.chain_interval =
                Duration::from_secs(parse_positive("CHAINPULSE_CHAIN_INTERVAL_SECS", &raw)?);
        }
        if let Some(raw) = read("CHAINPULSE_FEED_INTERVAL_SECS", None) {
            settings.feed_interval =
                Duration::from_secs(parse_positive("CHAINPULSE_FEED_INTERVAL_SECS", &raw)?);
        }

        Ok(settings)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn with_intervals(mut self, chain: Duration, feed: Duration) -> Self {
        self.chain_interval = chain;
        self.feed_interval = feed;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        expected: "an unsigned integer",
        value: raw.to_string(),
    })?;
    if value == 0 {
        return Err(ConfigError::ZeroValue { name });
    }
    Ok(value)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults_without_key() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.has_api_key());
        assert_eq!(settings.chain_interval, Duration::from_secs(30));
        assert_eq!(settings.feed_interval, Duration::from_secs(300));
    }

    #[test]
    fn prefixed_key_wins_over_unprefixed() {
        let settings = Settings::from_lookup(lookup(&[
            ("CHAINPULSE_ALCHEMY_API_KEY", "primary"),
            ("ALCHEMY_API_KEY", "secondary"),
        ]))
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("primary"));

        let settings = Settings::from_lookup(lookup(&[("ALCHEMY_API_KEY", "secondary")])).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("secondary"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let settings = Settings::from_lookup(lookup(&[("ALCHEMY_API_KEY", "   ")])).unwrap();
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn numeric_settings_are_validated() {
        let error =
            Settings::from_lookup(lookup(&[("CHAINPULSE_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { name: "CHAINPULSE_TIMEOUT_MS", .. }));

        let error =
            Settings::from_lookup(lookup(&[("CHAINPULSE_CHAIN_INTERVAL_SECS", "0")])).unwrap_err();
        assert_eq!(error, ConfigError::ZeroValue { name: "CHAINPULSE_CHAIN_INTERVAL_SECS" });
    }

    #[test]
    fn rpc_url_must_be_http() {
        let error =
            Settings::from_lookup(lookup(&[("CHAINPULSE_RPC_URL", "ws://node")])).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidRpcUrl { .. }));

        let settings =
            Settings::from_lookup(lookup(&[("CHAINPULSE_RPC_URL", "https://node.test/v2/")]))
                .unwrap();
        assert_eq!(settings.rpc_url, "https://node.test/v2");
    }

    #[test]
    fn debug_output_redacts_key() {
        let settings = Settings::default().with_api_key("secret-key");
        assert!(!format!("{settings:?}").contains("secret-key"));
    }

    #[test]
    fn millisecond_conversion_saturates() {
        assert_eq!(duration_millis(Duration::from_secs(30)), 30_000);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }
}
