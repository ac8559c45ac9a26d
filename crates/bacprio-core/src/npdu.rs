use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet network layer protocol version (always `0x01`).
pub const NPDU_VERSION: u8 = 0x01;

pub const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
pub const CONTROL_DESTINATION: u8 = 0x20;
pub const CONTROL_SOURCE: u8 = 0x08;
pub const CONTROL_EXPECTING_REPLY: u8 = 0x04;
pub const CONTROL_PRIORITY_MASK: u8 = 0x03;

/// A remote network number plus MAC address, present only on routed traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpduAddress {
    pub network: u16,
    pub mac: [u8; 6],
    pub mac_len: u8,
}

/// NPDU header.
///
/// Outbound requests use [`Npdu::local`]: no routing, normal priority. Inbound
/// headers may still carry source/destination fields, which are parsed so the
/// APDU behind them can be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npdu {
    pub control: u8,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: Option<u8>,
    pub message_type: Option<u8>,
    pub vendor_id: Option<u16>,
}

impl Npdu {
    pub const fn new(control: u8) -> Self {
        Self {
            control,
            destination: None,
            source: None,
            hop_count: None,
            message_type: None,
            vendor_id: None,
        }
    }

    /// Header for an APDU addressed to a device on the local network.
    pub const fn local() -> Self {
        Self::new(0)
    }

    pub const fn is_network_message(&self) -> bool {
        self.control & CONTROL_NETWORK_MESSAGE != 0
    }

    pub const fn expects_reply(&self) -> bool {
        self.control & CONTROL_EXPECTING_REPLY != 0
    }

    pub const fn priority(&self) -> u8 {
        self.control & CONTROL_PRIORITY_MASK
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(NPDU_VERSION)?;
        w.write_u8(self.control)?;
        if let Some(dest) = self.destination {
            encode_addr(w, dest)?;
        }
        if let Some(src) = self.source {
            encode_addr(w, src)?;
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count.unwrap_or(255))?;
        }
        if self.is_network_message() {
            let message_type = self.message_type.unwrap_or(0);
            w.write_u8(message_type)?;
            if message_type >= 0x80 {
                w.write_be_u16(self.vendor_id.unwrap_or(0))?;
            }
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }
        let mut npdu = Self::new(r.read_u8()?);
        if npdu.control & CONTROL_DESTINATION != 0 {
            npdu.destination = Some(decode_addr(r)?);
        }
        if npdu.control & CONTROL_SOURCE != 0 {
            npdu.source = Some(decode_addr(r)?);
        }
        if npdu.destination.is_some() {
            npdu.hop_count = Some(r.read_u8()?);
        }
        if npdu.is_network_message() {
            let message_type = r.read_u8()?;
            npdu.message_type = Some(message_type);
            if message_type >= 0x80 {
                npdu.vendor_id = Some(r.read_be_u16()?);
            }
        }
        Ok(npdu)
    }
}

/// Splits a network-layer frame into its header and the APDU that follows.
pub fn split_apdu(frame: &[u8]) -> Result<(Npdu, &[u8]), DecodeError> {
    let mut r = Reader::new(frame);
    let npdu = Npdu::decode(&mut r)?;
    Ok((npdu, r.rest()))
}

fn encode_addr(w: &mut Writer<'_>, addr: NpduAddress) -> Result<(), EncodeError> {
    let mac = addr
        .mac
        .get(..usize::from(addr.mac_len))
        .ok_or(EncodeError::InvalidLength)?;
    w.write_be_u16(addr.network)?;
    w.write_u8(addr.mac_len)?;
    w.write_all(mac)
}

fn decode_addr(r: &mut Reader<'_>) -> Result<NpduAddress, DecodeError> {
    let network = r.read_be_u16()?;
    let mac_len = r.read_u8()?;
    if usize::from(mac_len) > 6 {
        return Err(DecodeError::InvalidLength);
    }
    let mut mac = [0u8; 6];
    mac[..usize::from(mac_len)].copy_from_slice(r.read_exact(usize::from(mac_len))?);
    Ok(NpduAddress {
        network,
        mac,
        mac_len,
    })
}
