//! BACnet/IP data link for bacprio.
//!
//! [`BacnetIpTransport`] frames NPDUs in BVLC headers over a tokio UDP socket.
//! The [`DataLink`] trait adds the local-network NPDU on the way out and strips
//! it on the way in, so callers deal in APDUs.

pub mod address;
pub mod bip;
pub mod traits;

pub use address::DataLinkAddress;
pub use bip::transport::BacnetIpTransport;
pub use traits::{DataLink, DataLinkError};
