use crate::apdu::{AbortPdu, ApduType, BacnetError, ComplexAckHeader, RejectPdu, SimpleAck};
use crate::encoding::reader::Reader;
use crate::services::{check_service_choice, ReadPropertyAck, SERVICE_READ_PROPERTY};
use crate::DecodeError;

/// A decoded reply to a ReadProperty or WriteProperty request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponsePdu<'a> {
    SimpleAck(SimpleAck),
    ComplexAck { invoke_id: u8, ack: ReadPropertyAck<'a> },
    Error(BacnetError),
    Reject(RejectPdu),
    Abort(AbortPdu),
}

/// Every response PDU carries its invoke ID in the second octet.
pub fn peek_invoke_id(apdu: &[u8]) -> Result<u8, DecodeError> {
    apdu.get(1).copied().ok_or(DecodeError::MalformedApdu)
}

impl<'a> ResponsePdu<'a> {
    /// Classifies a response APDU by its leading PDU type nibble and decodes it.
    ///
    /// Truncated or ill-formed input is [`DecodeError::MalformedApdu`]; acks and
    /// errors for services other than ReadProperty/WriteProperty are
    /// [`DecodeError::UnsupportedService`].
    pub fn decode(apdu: &'a [u8]) -> Result<Self, DecodeError> {
        Self::decode_inner(apdu).map_err(DecodeError::into_apdu_error)
    }

    fn decode_inner(apdu: &'a [u8]) -> Result<Self, DecodeError> {
        let kind = ApduType::of(apdu).ok_or(DecodeError::MalformedApdu)?;
        let mut r = Reader::new(apdu);
        match kind {
            ApduType::SimpleAck => {
                let ack = SimpleAck::decode(&mut r)?;
                check_service_choice(ack.service_choice)?;
                Ok(Self::SimpleAck(ack))
            }
            ApduType::ComplexAck => {
                let header = ComplexAckHeader::decode(&mut r)?;
                if header.segmented {
                    return Err(DecodeError::MalformedApdu);
                }
                check_service_choice(header.service_choice)?;
                if header.service_choice != SERVICE_READ_PROPERTY {
                    // WriteProperty is acknowledged with a SimpleACK only.
                    return Err(DecodeError::MalformedApdu);
                }
                Ok(Self::ComplexAck {
                    invoke_id: header.invoke_id,
                    ack: ReadPropertyAck::decode_after_header(&mut r)?,
                })
            }
            ApduType::Error => {
                // Service choice is checked before the class/code payload.
                check_service_choice(*apdu.get(2).ok_or(DecodeError::MalformedApdu)?)?;
                Ok(Self::Error(BacnetError::decode(&mut r)?))
            }
            ApduType::Reject => Ok(Self::Reject(RejectPdu::decode(&mut r)?)),
            ApduType::Abort => Ok(Self::Abort(AbortPdu::decode(&mut r)?)),
            ApduType::ConfirmedRequest | ApduType::UnconfirmedRequest | ApduType::SegmentAck => {
                Err(DecodeError::MalformedApdu)
            }
        }
    }

    pub const fn invoke_id(&self) -> u8 {
        match self {
            Self::SimpleAck(ack) => ack.invoke_id,
            Self::ComplexAck { invoke_id, .. } => *invoke_id,
            Self::Error(err) => err.invoke_id,
            Self::Reject(rej) => rej.invoke_id,
            Self::Abort(abort) => abort.invoke_id,
        }
    }

    /// Reject and Abort PDUs do not name the service they answer.
    pub const fn service_choice(&self) -> Option<u8> {
        match self {
            Self::SimpleAck(ack) => Some(ack.service_choice),
            Self::ComplexAck { .. } => Some(SERVICE_READ_PROPERTY),
            Self::Error(err) => Some(err.service_choice),
            Self::Reject(_) | Self::Abort(_) => None,
        }
    }
}
