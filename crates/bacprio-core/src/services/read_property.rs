use crate::apdu::{ComplexAckHeader, ConfirmedRequestHeader};
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, encode_closing_tag, encode_ctx_object_id,
        encode_ctx_unsigned, encode_opening_tag, expect_tag, next_is_context,
    },
    reader::Reader,
    tag::Tag,
    writer::Writer,
};
use crate::services::value_codec::{decode_application_data_value, encode_application_data_value};
use crate::types::{DataValue, ObjectId, PropertyId};
use crate::{DecodeError, EncodeError};

pub const SERVICE_READ_PROPERTY: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyRequest {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub invoke_id: u8,
}

impl ReadPropertyRequest {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_READ_PROPERTY).encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id.raw())?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        Ok(())
    }

    /// Decodes the service parameters that follow a confirmed-request header.
    pub fn decode_after_header(r: &mut Reader<'_>, invoke_id: u8) -> Result<Self, DecodeError> {
        let object_id = ObjectId::from_raw(decode_ctx_object_id(r, 0)?);
        let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 1)?);
        let array_index = if next_is_context(r, 2) {
            Some(decode_ctx_unsigned(r, 2)?)
        } else {
            None
        };
        Ok(Self {
            object_id,
            property_id,
            array_index,
            invoke_id,
        })
    }
}

/// Payload of a ReadProperty ComplexACK.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadPropertyAck<'a> {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: DataValue<'a>,
}

impl<'a> ReadPropertyAck<'a> {
    /// Writes a complete unsegmented ComplexACK, header included.
    pub fn encode(&self, w: &mut Writer<'_>, invoke_id: u8) -> Result<(), EncodeError> {
        ComplexAckHeader::new(invoke_id, SERVICE_READ_PROPERTY).encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id.raw())?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        encode_opening_tag(w, 3)?;
        encode_application_data_value(w, &self.value)?;
        encode_closing_tag(w, 3)
    }

    /// Decodes the service ACK that follows a ComplexACK header.
    ///
    /// The property value must be a single application-tagged primitive.
    pub fn decode_after_header(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let object_id = ObjectId::from_raw(decode_ctx_object_id(r, 0)?);
        let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 1)?);
        let array_index = if next_is_context(r, 2) {
            Some(decode_ctx_unsigned(r, 2)?)
        } else {
            None
        };
        expect_tag(r, Tag::Opening { tag_num: 3 })?;
        let value = decode_application_data_value(r)?;
        expect_tag(r, Tag::Closing { tag_num: 3 })?;
        Ok(Self {
            object_id,
            property_id,
            array_index,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY};
    use crate::apdu::{ComplexAckHeader, ConfirmedRequestHeader};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{DataValue, ObjectId, ObjectType, PropertyId};
    use crate::DecodeError;

    #[test]
    fn request_with_array_index() {
        let req = ReadPropertyRequest {
            object_id: ObjectId::new(ObjectType::AnalogOutput, 1),
            property_id: PropertyId::PriorityArray,
            array_index: Some(8),
            invoke_id: 3,
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        req.encode(&mut w).unwrap();
        assert_eq!(
            w.as_written(),
            &[0x00, 0x05, 0x03, 0x0C, 0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x57, 0x29, 0x08]
        );

        let mut r = Reader::new(w.as_written());
        let hdr = ConfirmedRequestHeader::decode(&mut r).unwrap();
        assert_eq!(hdr.service_choice, SERVICE_READ_PROPERTY);
        assert_eq!(ReadPropertyRequest::decode_after_header(&mut r, hdr.invoke_id).unwrap(), req);
    }

    #[test]
    fn ack_carrying_real() {
        let apdu = [
            0x30, 0x01, 0x0C, 0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x44, 0x42, 0x91,
            0x00, 0x00, 0x3F,
        ];
        let mut r = Reader::new(&apdu);
        let hdr = ComplexAckHeader::decode(&mut r).unwrap();
        assert_eq!(hdr.invoke_id, 1);
        let ack = ReadPropertyAck::decode_after_header(&mut r).unwrap();
        assert_eq!(ack.object_id, ObjectId::new(ObjectType::AnalogOutput, 1));
        assert_eq!(ack.property_id, PropertyId::PresentValue);
        assert_eq!(ack.array_index, None);
        assert_eq!(ack.value, DataValue::Real(72.5));

        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        ack.encode(&mut w, 1).unwrap();
        assert_eq!(w.as_written(), &apdu);
    }

    #[test]
    fn ack_missing_closing_tag() {
        let payload = [
            0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x44, 0x42, 0x91, 0x00, 0x00,
        ];
        let mut r = Reader::new(&payload);
        assert_eq!(
            ReadPropertyAck::decode_after_header(&mut r).unwrap_err(),
            DecodeError::UnexpectedEof
        );
    }
}
