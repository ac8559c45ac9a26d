//! Shared command-line plumbing for the bacprio tools.

use bacprio_client::{BacnetClient, BacnetIpTransport, ClientConfig, ClientError};
use bacprio_core::types::{ObjectId, PropertyId};
use bacprio_datalink::DataLinkAddress;
use clap::Args;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Where the device is and how to reach it.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Device IP address.
    #[arg(long)]
    pub ip: IpAddr,
    /// Device UDP port.
    #[arg(long, default_value_t = DataLinkAddress::BACNET_IP_DEFAULT_PORT)]
    pub port: u16,
    /// Local address to bind.
    #[arg(long, env = "BACNET_BIND", default_value = "0.0.0.0:47808")]
    pub bind: SocketAddr,
    /// Per-attempt response timeout in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub timeout_ms: u64,
    /// Re-sends after a timeout.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,
}

impl ConnectionArgs {
    pub fn device(&self) -> DataLinkAddress {
        DataLinkAddress::Ip(SocketAddr::new(self.ip, self.port))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_bind_addr(self.bind)
            .with_apdu_timeout(Duration::from_millis(self.timeout_ms))
            .with_apdu_retries(self.retries)
    }

    pub async fn connect(&self) -> Result<BacnetClient<BacnetIpTransport>, ClientError> {
        BacnetClient::with_config(self.client_config()).await
    }
}

/// The object property a tool operates on.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Object as `type:instance`, e.g. `analog-output:1`.
    #[arg(long)]
    pub object: ObjectId,
    /// Property name or number.
    #[arg(long, default_value = "present-value")]
    pub property: PropertyId,
}

/// Prints `err` and exits non-zero.
pub fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}
