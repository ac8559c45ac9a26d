use crate::encoding::{
    reader::Reader,
    tag::{RawTag, Tag, TagClass},
    writer::Writer,
};
use crate::{DecodeError, EncodeError};

/// Minimal big-endian width of an unsigned value.
pub const fn unsigned_len(value: u32) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Minimal two's-complement width of a signed value.
pub const fn signed_len(value: i32) -> usize {
    match value {
        -128..=127 => 1,
        -32_768..=32_767 => 2,
        -8_388_608..=8_388_607 => 3,
        _ => 4,
    }
}

pub fn encode_unsigned(w: &mut Writer<'_>, value: u32) -> Result<usize, EncodeError> {
    let len = unsigned_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn encode_signed(w: &mut Writer<'_>, value: i32) -> Result<usize, EncodeError> {
    let len = signed_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

/// Interprets 1–4 big-endian bytes as an unsigned value.
pub fn unsigned_from_bytes(bytes: &[u8]) -> Result<u32, DecodeError> {
    if bytes.is_empty() || bytes.len() > 4 {
        return Err(DecodeError::InvalidLength);
    }
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

/// Interprets 1–4 big-endian bytes as a sign-extended value.
pub fn signed_from_bytes(bytes: &[u8]) -> Result<i32, DecodeError> {
    if bytes.is_empty() || bytes.len() > 4 {
        return Err(DecodeError::InvalidLength);
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 4];
    out[4 - bytes.len()..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(out))
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    unsigned_from_bytes(r.read_exact(len)?)
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    signed_from_bytes(r.read_exact(len)?)
}

pub fn encode_ctx_unsigned(w: &mut Writer<'_>, tag_num: u8, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value);
    RawTag::context(tag_num, &value.to_be_bytes()[4 - len..]).encode(w)
}

pub fn encode_ctx_object_id(
    w: &mut Writer<'_>,
    tag_num: u8,
    object_id_raw: u32,
) -> Result<(), EncodeError> {
    RawTag::context(tag_num, &object_id_raw.to_be_bytes()).encode(w)
}

pub fn encode_opening_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

/// Consumes the next tag, which must be context tag `tag_num`, and returns its payload.
pub fn decode_ctx_payload<'a>(r: &mut Reader<'a>, tag_num: u8) -> Result<&'a [u8], DecodeError> {
    let tag = RawTag::decode(r)?;
    if tag.class != TagClass::Context || tag.number != tag_num {
        return Err(DecodeError::InvalidTag);
    }
    Ok(tag.value)
}

pub fn decode_ctx_unsigned(r: &mut Reader<'_>, tag_num: u8) -> Result<u32, DecodeError> {
    unsigned_from_bytes(decode_ctx_payload(r, tag_num)?)
}

pub fn decode_ctx_object_id(r: &mut Reader<'_>, tag_num: u8) -> Result<u32, DecodeError> {
    match decode_ctx_payload(r, tag_num)? {
        [a, b, c, d] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(DecodeError::InvalidLength),
    }
}

/// Consumes `tag` if it is the next thing in the stream.
pub fn expect_tag(r: &mut Reader<'_>, tag: Tag) -> Result<(), DecodeError> {
    if Tag::decode(r)? == tag {
        Ok(())
    } else {
        Err(DecodeError::InvalidTag)
    }
}

/// Peeks whether the next tag is context tag `tag_num` (primitive or opening).
pub fn next_is_context(r: &Reader<'_>, tag_num: u8) -> bool {
    let mut probe = *r;
    matches!(
        Tag::decode(&mut probe),
        Ok(Tag::Context { tag_num: n, .. } | Tag::Opening { tag_num: n }) if n == tag_num
    )
}

#[cfg(test)]
mod tests {
    use super::{
        decode_ctx_object_id, decode_ctx_unsigned, decode_signed, decode_unsigned,
        encode_ctx_object_id, encode_ctx_unsigned, encode_signed, encode_unsigned,
        next_is_context, signed_from_bytes, unsigned_from_bytes,
    };
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;
    use proptest::prelude::*;

    #[test]
    fn unsigned_uses_minimal_width() {
        let mut b = [0u8; 4];
        let mut w = Writer::new(&mut b);
        assert_eq!(encode_unsigned(&mut w, 0x0100).unwrap(), 2);
        assert_eq!(w.as_written(), &[0x01, 0x00]);
    }

    #[test]
    fn negative_values_sign_extend() {
        assert_eq!(signed_from_bytes(&[0xFF]).unwrap(), -1);
        assert_eq!(signed_from_bytes(&[0xFF, 0x7F]).unwrap(), -129);
        assert_eq!(signed_from_bytes(&[0x7F]).unwrap(), 127);
        assert_eq!(unsigned_from_bytes(&[]).unwrap_err(), DecodeError::InvalidLength);
        assert_eq!(
            unsigned_from_bytes(&[1, 2, 3, 4, 5]).unwrap_err(),
            DecodeError::InvalidLength
        );
    }

    #[test]
    fn context_helpers_check_slot_number() {
        let mut b = [0u8; 16];
        let mut w = Writer::new(&mut b);
        encode_ctx_object_id(&mut w, 0, 0x0040_0001).unwrap();
        encode_ctx_unsigned(&mut w, 1, 85).unwrap();
        assert_eq!(
            w.as_written(),
            &[0x0C, 0x00, 0x40, 0x00, 0x01, 0x19, 0x55]
        );

        let mut r = Reader::new(w.as_written());
        assert!(next_is_context(&r, 0));
        assert!(!next_is_context(&r, 1));
        assert_eq!(decode_ctx_object_id(&mut r, 0).unwrap(), 0x0040_0001);
        assert_eq!(decode_ctx_unsigned(&mut r, 2).unwrap_err(), DecodeError::InvalidTag);
    }

    proptest! {
        #[test]
        fn unsigned_roundtrip(v in any::<u32>()) {
            let mut b = [0u8; 4];
            let mut w = Writer::new(&mut b);
            let len = encode_unsigned(&mut w, v).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_unsigned(&mut r, len).unwrap(), v);
        }

        #[test]
        fn signed_roundtrip(v in any::<i32>()) {
            let mut b = [0u8; 4];
            let mut w = Writer::new(&mut b);
            let len = encode_signed(&mut w, v).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_signed(&mut r, len).unwrap(), v);
        }
    }
}
