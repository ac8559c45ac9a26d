/// Confirmed-request header and the individual response PDUs.
pub mod confirmed;
/// APDU type discriminant.
pub mod pdu;
/// Classification of an inbound response APDU.
pub mod response;

pub use confirmed::{
    AbortPdu, BacnetError, ComplexAckHeader, ConfirmedRequestHeader, RejectPdu, SimpleAck,
};
pub use pdu::ApduType;
pub use response::{peek_invoke_id, ResponsePdu};
