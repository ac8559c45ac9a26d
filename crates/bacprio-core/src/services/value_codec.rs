use crate::encoding::{
    primitives::{
        encode_signed, encode_unsigned, signed_from_bytes, signed_len, unsigned_from_bytes,
        unsigned_len,
    },
    reader::Reader,
    tag::{AppTag, RawTag, Tag, TagClass},
    writer::Writer,
};
use crate::types::{DataValue, ObjectId};
use crate::{DecodeError, EncodeError};

/// Character set code for UTF-8 (ANSI X3.4 superset) character strings.
const CHARSET_UTF8: u8 = 0;

fn content_len(value: &DataValue<'_>) -> Result<u32, EncodeError> {
    let len = match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Unsigned(v) | DataValue::Enumerated(v) => unsigned_len(*v),
        DataValue::Signed(v) => signed_len(*v),
        DataValue::Real(_) | DataValue::ObjectId(_) => 4,
        DataValue::Double(_) => 8,
        DataValue::OctetString(bytes) => bytes.len(),
        DataValue::CharacterString(s) => s.len() + 1,
    };
    u32::try_from(len).map_err(|_| EncodeError::InvalidLength)
}

fn write_content(w: &mut Writer<'_>, value: &DataValue<'_>) -> Result<(), EncodeError> {
    match value {
        DataValue::Null => Ok(()),
        DataValue::Boolean(v) => w.write_u8(u8::from(*v)),
        DataValue::Unsigned(v) | DataValue::Enumerated(v) => encode_unsigned(w, *v).map(drop),
        DataValue::Signed(v) => encode_signed(w, *v).map(drop),
        DataValue::Real(v) => w.write_all(&v.to_be_bytes()),
        DataValue::Double(v) => w.write_all(&v.to_be_bytes()),
        DataValue::OctetString(bytes) => w.write_all(bytes),
        DataValue::CharacterString(s) => {
            w.write_u8(CHARSET_UTF8)?;
            w.write_all(s.as_bytes())
        }
        DataValue::ObjectId(id) => w.write_be_u32(id.raw()),
    }
}

/// Writes `value` as one tag.
///
/// Application class derives the tag number from the value's type and ignores
/// `tag_num`; context class uses `tag_num` as the slot. A context-tagged
/// [`DataValue::Null`] is a single header byte with length 0, which is how a
/// priority slot is relinquished.
pub fn encode_value(
    w: &mut Writer<'_>,
    value: &DataValue<'_>,
    tag_num: u8,
    class: TagClass,
) -> Result<(), EncodeError> {
    let len = content_len(value)?;
    match class {
        TagClass::Application => {
            if let DataValue::Boolean(v) = value {
                return Tag::Application {
                    tag: AppTag::Boolean,
                    len: u32::from(*v),
                }
                .encode(w);
            }
            Tag::Application {
                tag: value.app_tag(),
                len,
            }
            .encode(w)?;
        }
        TagClass::Context => Tag::Context { tag_num, len }.encode(w)?,
    }
    write_content(w, value)
}

pub fn encode_application_data_value(
    w: &mut Writer<'_>,
    value: &DataValue<'_>,
) -> Result<(), EncodeError> {
    encode_value(w, value, 0, TagClass::Application)
}

/// Interprets a tag's payload as `expected`.
///
/// Application tags must carry `expected` itself; context tags are trusted to
/// hold it, so only the payload length is checked.
pub fn decode_value<'a>(tag: RawTag<'a>, expected: AppTag) -> Result<DataValue<'a>, DecodeError> {
    if tag.class == TagClass::Application && tag.number != expected as u8 {
        return Err(DecodeError::TypeMismatch);
    }
    let v = tag.value;
    let value = match expected {
        AppTag::Null if v.is_empty() => DataValue::Null,
        AppTag::Boolean => match v {
            [b @ (0 | 1)] => DataValue::Boolean(*b == 1),
            _ => return Err(DecodeError::TypeMismatch),
        },
        AppTag::UnsignedInt => DataValue::Unsigned(fixed_int(unsigned_from_bytes(v))?),
        AppTag::Enumerated => DataValue::Enumerated(fixed_int(unsigned_from_bytes(v))?),
        AppTag::SignedInt => DataValue::Signed(fixed_int(signed_from_bytes(v))?),
        AppTag::Real => match v {
            [a, b, c, d] => DataValue::Real(f32::from_be_bytes([*a, *b, *c, *d])),
            _ => return Err(DecodeError::TypeMismatch),
        },
        AppTag::Double => {
            let bytes: [u8; 8] = v.try_into().map_err(|_| DecodeError::TypeMismatch)?;
            DataValue::Double(f64::from_be_bytes(bytes))
        }
        AppTag::ObjectId => match v {
            [a, b, c, d] => {
                DataValue::ObjectId(ObjectId::from_raw(u32::from_be_bytes([*a, *b, *c, *d])))
            }
            _ => return Err(DecodeError::TypeMismatch),
        },
        AppTag::OctetString => DataValue::OctetString(v),
        AppTag::CharacterString => match v.split_first() {
            Some((&CHARSET_UTF8, text)) => DataValue::CharacterString(
                core::str::from_utf8(text).map_err(|_| DecodeError::InvalidValue)?,
            ),
            Some(_) => return Err(DecodeError::Unsupported),
            None => return Err(DecodeError::TypeMismatch),
        },
        AppTag::BitString | AppTag::Date | AppTag::Time => return Err(DecodeError::Unsupported),
        AppTag::Null => return Err(DecodeError::TypeMismatch),
    };
    Ok(value)
}

fn fixed_int<T>(decoded: Result<T, DecodeError>) -> Result<T, DecodeError> {
    decoded.map_err(|_| DecodeError::TypeMismatch)
}

/// Reads one application-tagged value, taking its type from the tag.
pub fn decode_application_data_value<'a>(r: &mut Reader<'a>) -> Result<DataValue<'a>, DecodeError> {
    let tag = RawTag::decode(r)?;
    if tag.class != TagClass::Application {
        return Err(DecodeError::InvalidTag);
    }
    decode_value(tag, AppTag::from_u8(tag.number)?)
}
