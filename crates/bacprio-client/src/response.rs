use crate::{ClientDataValue, ClientError};
use bacprio_core::apdu::ResponsePdu;
use bacprio_core::types::{ObjectId, PropertyId};

/// The decoded ReadProperty ComplexACK.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadPropertyResult {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: ClientDataValue,
}

/// How a confirmed request ended. Delivered once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    SimpleAck,
    ComplexAck(ReadPropertyResult),
    Error {
        service_choice: u8,
        error_class: u32,
        error_code: u32,
    },
    Reject {
        reason: u8,
    },
    Abort {
        reason: u8,
        server: bool,
    },
    /// No response after the last retry.
    Timeout,
}

impl Response {
    /// Converts a PDU borrowed from the receive buffer.
    pub fn from_pdu(pdu: ResponsePdu<'_>) -> Self {
        match pdu {
            ResponsePdu::SimpleAck(_) => Self::SimpleAck,
            ResponsePdu::ComplexAck { ack, .. } => Self::ComplexAck(ReadPropertyResult {
                object_id: ack.object_id,
                property_id: ack.property_id,
                array_index: ack.array_index,
                value: ack.value.into(),
            }),
            ResponsePdu::Error(err) => Self::Error {
                service_choice: err.service_choice,
                error_class: err.error_class,
                error_code: err.error_code,
            },
            ResponsePdu::Reject(rej) => Self::Reject { reason: rej.reason },
            ResponsePdu::Abort(abort) => Self::Abort {
                reason: abort.reason,
                server: abort.server,
            },
        }
    }

    /// Maps the failure outcomes onto [`ClientError`]. A SimpleACK yields
    /// `None`, a ComplexACK its read result.
    pub fn into_result(self) -> Result<Option<ReadPropertyResult>, ClientError> {
        match self {
            Self::SimpleAck => Ok(None),
            Self::ComplexAck(result) => Ok(Some(result)),
            Self::Error {
                service_choice,
                error_class,
                error_code,
            } => Err(ClientError::remote_service_error(
                service_choice,
                error_class,
                error_code,
            )),
            Self::Reject { reason } => Err(ClientError::RemoteReject { reason }),
            Self::Abort { reason, server } => Err(ClientError::RemoteAbort { reason, server }),
            Self::Timeout => Err(ClientError::Timeout),
        }
    }
}
