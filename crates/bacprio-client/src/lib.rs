//! Async BACnet/IP client for ReadProperty and WriteProperty.
//!
//! [`BacnetClient`] sends confirmed requests over a [`DataLink`](bacprio_datalink::DataLink),
//! usually [`BacnetIpTransport`], and matches the responses back to their
//! requests by invoke ID. Relinquishing a commanded priority is
//! [`BacnetClient::write_property_null`].
//!
//! ```no_run
//! use bacprio_client::{BacnetClient, ClientConfig};
//! use bacprio_core::types::{ObjectId, ObjectType, PropertyId};
//!
//! # async fn demo() -> Result<(), bacprio_client::ClientError> {
//! let client = BacnetClient::with_config(ClientConfig::default()).await?;
//! let device = "192.168.1.20".parse::<bacprio_datalink::DataLinkAddress>().expect("address");
//! let ao1 = ObjectId::new(ObjectType::AnalogOutput, 1);
//!
//! let before = client.read_real(device, ao1, PropertyId::PresentValue).await?;
//! client
//!     .write_property_null(device, ao1, PropertyId::PresentValue, 8)
//!     .await?;
//! # let _ = before;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod correlator;
pub mod error;
pub mod response;
pub mod value;

#[cfg(test)]
mod test_support;

pub use bacprio_datalink::BacnetIpTransport;
pub use client::BacnetClient;
pub use config::{ClientConfig, ConfigError};
pub use correlator::{Correlator, PendingRequest};
pub use error::ClientError;
pub use response::{ReadPropertyResult, Response};
pub use value::ClientDataValue;
