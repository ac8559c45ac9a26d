use crate::apdu::ApduType;
use crate::encoding::{
    primitives::unsigned_from_bytes,
    reader::Reader,
    tag::{AppTag, RawTag, Tag, TagClass},
    writer::Writer,
};
use crate::types::MaxApdu;
use crate::{DecodeError, EncodeError};

const PDU_FLAG_SEGMENTED: u8 = 0b0000_1000;
const PDU_FLAG_MORE_FOLLOWS: u8 = 0b0000_0100;
const PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED: u8 = 0b0000_0010;
const PDU_FLAG_SERVER: u8 = 0b0000_0001;

fn expect_type(r: &mut Reader<'_>, kind: ApduType) -> Result<u8, DecodeError> {
    let b0 = r.read_u8()?;
    if b0 >> 4 != kind as u8 {
        return Err(DecodeError::InvalidValue);
    }
    Ok(b0)
}

/// Header of an unsegmented confirmed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRequestHeader {
    pub segmented_response_accepted: bool,
    pub max_segments: u8,
    pub max_apdu: MaxApdu,
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ConfirmedRequestHeader {
    /// Unsegmented, no segmented responses, 1476-octet APDUs.
    pub const fn new(invoke_id: u8, service_choice: u8) -> Self {
        Self {
            segmented_response_accepted: false,
            max_segments: 0,
            max_apdu: MaxApdu::UpTo1476,
            invoke_id,
            service_choice,
        }
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = (ApduType::ConfirmedRequest as u8) << 4;
        if self.segmented_response_accepted {
            b0 |= PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED;
        }
        w.write_u8(b0)?;
        w.write_u8(((self.max_segments & 0x07) << 4) | self.max_apdu as u8)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    /// Segmented requests are reported as [`DecodeError::Unsupported`].
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_type(r, ApduType::ConfirmedRequest)?;
        if b0 & PDU_FLAG_SEGMENTED != 0 {
            return Err(DecodeError::Unsupported);
        }
        let seg_apdu = r.read_u8()?;
        let max_apdu = match seg_apdu & 0x0F {
            0 => MaxApdu::UpTo50,
            1 => MaxApdu::UpTo128,
            2 => MaxApdu::UpTo206,
            3 => MaxApdu::UpTo480,
            4 => MaxApdu::UpTo1024,
            5 => MaxApdu::UpTo1476,
            _ => return Err(DecodeError::InvalidValue),
        };
        Ok(Self {
            segmented_response_accepted: b0 & PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED != 0,
            max_segments: (seg_apdu >> 4) & 0x07,
            max_apdu,
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexAckHeader {
    pub segmented: bool,
    pub more_follows: bool,
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ComplexAckHeader {
    pub const fn new(invoke_id: u8, service_choice: u8) -> Self {
        Self {
            segmented: false,
            more_follows: false,
            invoke_id,
            service_choice,
        }
    }

    /// Writes an unsegmented header; segmented acks are never produced.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if self.segmented {
            return Err(EncodeError::Unsupported);
        }
        w.write_u8((ApduType::ComplexAck as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_type(r, ApduType::ComplexAck)?;
        let segmented = b0 & PDU_FLAG_SEGMENTED != 0;
        let invoke_id = r.read_u8()?;
        if segmented {
            // Sequence number and proposed window size.
            r.read_exact(2)?;
        }
        Ok(Self {
            segmented,
            more_follows: b0 & PDU_FLAG_MORE_FOLLOWS != 0,
            invoke_id,
            service_choice: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAck {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl SimpleAck {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8((ApduType::SimpleAck as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_type(r, ApduType::SimpleAck)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

/// Error PDU for a confirmed service.
///
/// Class and code are kept as raw enumeration values; see
/// [`ErrorClass`](crate::types::ErrorClass) and [`ErrorCode`](crate::types::ErrorCode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacnetError {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub error_class: u32,
    pub error_code: u32,
}

impl BacnetError {
    /// Writes class and code as application-tagged enumerations.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8((ApduType::Error as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)?;
        for value in [self.error_class, self.error_code] {
            let len = crate::encoding::primitives::unsigned_len(value);
            RawTag::application(AppTag::Enumerated, &value.to_be_bytes()[4 - len..]).encode(w)?;
        }
        Ok(())
    }

    /// Accepts class/code as application enumerations, as context tags 0/1,
    /// or wrapped in opening/closing tag 0.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_type(r, ApduType::Error)?;
        let invoke_id = r.read_u8()?;
        let service_choice = r.read_u8()?;

        let mut probe = *r;
        let wrapped = Tag::decode(&mut probe) == Ok(Tag::Opening { tag_num: 0 });
        if wrapped {
            *r = probe;
        }
        let error_class = decode_error_field(r, 0)?;
        let error_code = decode_error_field(r, 1)?;
        if wrapped && Tag::decode(r)? != (Tag::Closing { tag_num: 0 }) {
            return Err(DecodeError::InvalidTag);
        }
        Ok(Self {
            invoke_id,
            service_choice,
            error_class,
            error_code,
        })
    }
}

fn decode_error_field(r: &mut Reader<'_>, context_slot: u8) -> Result<u32, DecodeError> {
    let tag = RawTag::decode(r)?;
    let matches = match tag.class {
        TagClass::Application => tag.number == AppTag::Enumerated as u8,
        TagClass::Context => tag.number == context_slot,
    };
    if !matches {
        return Err(DecodeError::InvalidTag);
    }
    unsigned_from_bytes(tag.value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectPdu {
    pub invoke_id: u8,
    pub reason: u8,
}

impl RejectPdu {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8((ApduType::Reject as u8) << 4)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.reason)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_type(r, ApduType::Reject)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPdu {
    pub server: bool,
    pub invoke_id: u8,
    pub reason: u8,
}

impl AbortPdu {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = (ApduType::Abort as u8) << 4;
        if self.server {
            b0 |= PDU_FLAG_SERVER;
        }
        w.write_u8(b0)?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.reason)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_type(r, ApduType::Abort)?;
        Ok(Self {
            server: b0 & PDU_FLAG_SERVER != 0,
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}
