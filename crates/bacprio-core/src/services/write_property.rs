use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{
        decode_ctx_object_id, decode_ctx_unsigned, encode_closing_tag, encode_ctx_object_id,
        encode_ctx_unsigned, encode_opening_tag, expect_tag, next_is_context,
    },
    reader::Reader,
    tag::{AppTag, RawTag, Tag, TagClass},
    writer::Writer,
};
use crate::services::value_codec::{decode_value, encode_value};
use crate::types::{DataValue, ObjectId, ObjectType, PropertyId};
use crate::{DecodeError, EncodeError};

pub const SERVICE_WRITE_PROPERTY: u8 = 0x0F;

/// Lowest and highest command priority.
pub const PRIORITY_RANGE: core::ops::RangeInclusive<u8> = 1..=16;

/// Context slot used for the Null that relinquishes a priority level.
pub const RELINQUISH_TAG_NUMBER: u8 = 5;

/// Value carried between the opening and closing tag 3 of a WriteProperty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    /// An application-tagged primitive; the usual case.
    Application(DataValue<'a>),
    /// A primitive written under an explicit context slot.
    Context { tag_num: u8, value: DataValue<'a> },
}

impl<'a> PropertyValue<'a> {
    /// The zero-length context Null that clears the command at the request's priority.
    pub const fn relinquish() -> Self {
        Self::Context {
            tag_num: RELINQUISH_TAG_NUMBER,
            value: DataValue::Null,
        }
    }

    pub fn is_relinquish(&self) -> bool {
        *self == Self::relinquish()
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Application(value) => encode_value(w, value, 0, TagClass::Application),
            Self::Context { tag_num, value } => encode_value(w, value, *tag_num, TagClass::Context),
        }
    }

    /// Context payloads are only understood when empty, i.e. a Null.
    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let tag = RawTag::decode(r)?;
        match tag.class {
            TagClass::Application => Ok(Self::Application(decode_value(
                tag,
                AppTag::from_u8(tag.number)?,
            )?)),
            TagClass::Context if tag.value.is_empty() => Ok(Self::Context {
                tag_num: tag.number,
                value: DataValue::Null,
            }),
            TagClass::Context => Err(DecodeError::Unsupported),
        }
    }
}

impl<'a> From<DataValue<'a>> for PropertyValue<'a> {
    fn from(value: DataValue<'a>) -> Self {
        Self::Application(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WritePropertyRequest<'a> {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: PropertyValue<'a>,
    pub priority: Option<u8>,
    pub invoke_id: u8,
}

impl Default for WritePropertyRequest<'_> {
    fn default() -> Self {
        Self {
            object_id: ObjectId::new(ObjectType::AnalogValue, 0),
            property_id: PropertyId::PresentValue,
            array_index: None,
            value: PropertyValue::Application(DataValue::Null),
            priority: None,
            invoke_id: 0,
        }
    }
}

impl<'a> WritePropertyRequest<'a> {
    /// A Null write that relinquishes `priority` on `object_id.property_id`.
    pub fn relinquish(object_id: ObjectId, property_id: PropertyId, priority: u8) -> Self {
        Self {
            object_id,
            property_id,
            value: PropertyValue::relinquish(),
            priority: Some(priority),
            ..Default::default()
        }
    }

    /// Fails with [`EncodeError::ValueOutOfRange`] when a priority outside 1–16 is set.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if let Some(priority) = self.priority {
            if !PRIORITY_RANGE.contains(&priority) {
                return Err(EncodeError::ValueOutOfRange);
            }
        }

        ConfirmedRequestHeader::new(self.invoke_id, SERVICE_WRITE_PROPERTY).encode(w)?;
        encode_ctx_object_id(w, 0, self.object_id.raw())?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        encode_opening_tag(w, 3)?;
        self.value.encode(w)?;
        encode_closing_tag(w, 3)?;
        if let Some(priority) = self.priority {
            encode_ctx_unsigned(w, 4, u32::from(priority))?;
        }
        Ok(())
    }

    pub fn decode_after_header(r: &mut Reader<'a>, invoke_id: u8) -> Result<Self, DecodeError> {
        let object_id = ObjectId::from_raw(decode_ctx_object_id(r, 0)?);
        let property_id = PropertyId::from_u32(decode_ctx_unsigned(r, 1)?);
        let array_index = if next_is_context(r, 2) {
            Some(decode_ctx_unsigned(r, 2)?)
        } else {
            None
        };
        expect_tag(r, Tag::Opening { tag_num: 3 })?;
        let value = PropertyValue::decode(r)?;
        expect_tag(r, Tag::Closing { tag_num: 3 })?;
        let priority = if next_is_context(r, 4) {
            let raw = decode_ctx_unsigned(r, 4)?;
            let priority = u8::try_from(raw).map_err(|_| DecodeError::InvalidValue)?;
            if !PRIORITY_RANGE.contains(&priority) {
                return Err(DecodeError::InvalidValue);
            }
            Some(priority)
        } else {
            None
        };
        Ok(Self {
            object_id,
            property_id,
            array_index,
            value,
            priority,
            invoke_id,
        })
    }
}
