use bacprio_datalink::DataLinkAddress;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const ENV_BIND: &str = "BACNET_BIND";
pub const ENV_APDU_TIMEOUT_MS: &str = "BACNET_APDU_TIMEOUT_MS";
pub const ENV_APDU_RETRIES: &str = "BACNET_APDU_RETRIES";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {var}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Socket and retry settings for [`BacnetClient`](crate::BacnetClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub bind_addr: SocketAddr,
    /// Per-attempt wait for a response.
    pub apdu_timeout: Duration,
    /// Re-sends after the first attempt times out.
    pub apdu_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                DataLinkAddress::BACNET_IP_DEFAULT_PORT,
            ),
            apdu_timeout: Duration::from_secs(3),
            apdu_retries: 3,
        }
    }
}

impl ClientConfig {
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_apdu_timeout(mut self, timeout: Duration) -> Self {
        self.apdu_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn with_apdu_retries(mut self, retries: u32) -> Self {
        self.apdu_retries = retries;
        self
    }

    /// Defaults overridden by `BACNET_BIND`, `BACNET_APDU_TIMEOUT_MS` and
    /// `BACNET_APDU_RETRIES` where set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_BIND) {
            config.bind_addr = parse_var(ENV_BIND, value)?;
        }
        if let Some(value) = lookup(ENV_APDU_TIMEOUT_MS) {
            let ms: u64 = parse_var(ENV_APDU_TIMEOUT_MS, value)?;
            config = config.with_apdu_timeout(Duration::from_millis(ms));
        }
        if let Some(value) = lookup(ENV_APDU_RETRIES) {
            config.apdu_retries = parse_var(ENV_APDU_RETRIES, value)?;
        }
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError { var, value })
}
