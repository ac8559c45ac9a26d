//! BACnet encoding for a minimal ReadProperty / WriteProperty client.
//!
//! `bacprio-core` holds the zero-copy, `no_std`-compatible pieces of the stack:
//! the tag codec, primitive value codec, NPDU header, and the APDU codecs for
//! confirmed ReadProperty / WriteProperty requests and their responses.
//!
//! # Feature flags
//!
//! - **`std`** (default): enables `std::error::Error` implementations.
//! - **`serde`**: derives `Serialize`/`Deserialize` on identifier types.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

/// Confirmed-request header and the response PDUs a client receives.
pub mod apdu;
/// Tag system, primitive encoders and the zero-copy reader/writer.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// NPDU header encoding and decoding.
pub mod npdu;
/// ReadProperty / WriteProperty codecs and the tagged value codec.
pub mod services;
/// Object identifiers, property identifiers and primitive data values.
pub mod types;

pub use error::{DecodeError, EncodeError, ParseError};
