pub mod read_property;
pub mod value_codec;
pub mod write_property;

use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

pub use read_property::{ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY};
pub use write_property::{PropertyValue, WritePropertyRequest, SERVICE_WRITE_PROPERTY};

/// Returns `Ok` for the two confirmed services this crate speaks.
pub fn check_service_choice(service_choice: u8) -> Result<(), DecodeError> {
    match service_choice {
        SERVICE_READ_PROPERTY | SERVICE_WRITE_PROPERTY => Ok(()),
        other => Err(DecodeError::UnsupportedService(other)),
    }
}

/// A confirmed request ready to be framed and sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmedServiceRequest<'a> {
    ReadProperty(ReadPropertyRequest),
    WriteProperty(WritePropertyRequest<'a>),
}

impl<'a> ConfirmedServiceRequest<'a> {
    pub const fn service_choice(&self) -> u8 {
        match self {
            Self::ReadProperty(_) => SERVICE_READ_PROPERTY,
            Self::WriteProperty(_) => SERVICE_WRITE_PROPERTY,
        }
    }

    pub const fn invoke_id(&self) -> u8 {
        match self {
            Self::ReadProperty(req) => req.invoke_id,
            Self::WriteProperty(req) => req.invoke_id,
        }
    }

    pub fn set_invoke_id(&mut self, invoke_id: u8) {
        match self {
            Self::ReadProperty(req) => req.invoke_id = invoke_id,
            Self::WriteProperty(req) => req.invoke_id = invoke_id,
        }
    }

    /// Writes the complete APDU: confirmed-request header and service parameters.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::ReadProperty(req) => req.encode(w),
            Self::WriteProperty(req) => req.encode(w),
        }
    }

    /// Parses a confirmed-request APDU, as a device receiving it would.
    pub fn decode(apdu: &'a [u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(apdu);
        let header = ConfirmedRequestHeader::decode(&mut r)?;
        match header.service_choice {
            SERVICE_READ_PROPERTY => Ok(Self::ReadProperty(
                ReadPropertyRequest::decode_after_header(&mut r, header.invoke_id)?,
            )),
            SERVICE_WRITE_PROPERTY => Ok(Self::WriteProperty(
                WritePropertyRequest::decode_after_header(&mut r, header.invoke_id)?,
            )),
            other => Err(DecodeError::UnsupportedService(other)),
        }
    }
}

impl From<ReadPropertyRequest> for ConfirmedServiceRequest<'_> {
    fn from(req: ReadPropertyRequest) -> Self {
        Self::ReadProperty(req)
    }
}

impl<'a> From<WritePropertyRequest<'a>> for ConfirmedServiceRequest<'a> {
    fn from(req: WritePropertyRequest<'a>) -> Self {
        Self::WriteProperty(req)
    }
}
