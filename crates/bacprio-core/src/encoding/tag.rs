use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

const CLASS_CONTEXT: u8 = 0b0000_1000;
const EXTENDED_TAG_NUMBER: u8 = 0x0F;
const LVT_EXTENDED_LENGTH: u8 = 5;
const LVT_OPENING: u8 = 6;
const LVT_CLOSING: u8 = 7;

/// Highest tag number that can be written; 255 is reserved.
pub const MAX_TAG_NUMBER: u8 = 254;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::UnsignedInt,
            3 => Self::SignedInt,
            4 => Self::Real,
            5 => Self::Double,
            6 => Self::OctetString,
            7 => Self::CharacterString,
            8 => Self::BitString,
            9 => Self::Enumerated,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::ObjectId,
            _ => return Err(DecodeError::InvalidTag),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagClass {
    Application,
    Context,
}

/// Tag header as it is streamed while walking a service payload.
///
/// For application booleans `len` carries the boolean itself; there is no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

impl Tag {
    pub fn encode(self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Tag::Application { tag, len } => write_header(w, tag as u8, 0, len),
            Tag::Context { tag_num, len } => write_header(w, tag_num, CLASS_CONTEXT, len),
            Tag::Opening { tag_num } => write_marker(w, tag_num, LVT_OPENING),
            Tag::Closing { tag_num } => write_marker(w, tag_num, LVT_CLOSING),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let first = r.read_u8()?;
        let context = first & CLASS_CONTEXT != 0;

        let mut tag_num = first >> 4;
        if tag_num == EXTENDED_TAG_NUMBER {
            tag_num = r.read_u8()?;
            if tag_num > MAX_TAG_NUMBER {
                return Err(DecodeError::InvalidTag);
            }
        }

        let lvt = first & 0x07;
        match (context, lvt) {
            (true, LVT_OPENING) => Ok(Tag::Opening { tag_num }),
            (true, LVT_CLOSING) => Ok(Tag::Closing { tag_num }),
            (true, _) => Ok(Tag::Context {
                tag_num,
                len: read_length(r, lvt)?,
            }),
            (false, _) => Ok(Tag::Application {
                tag: AppTag::from_u8(tag_num)?,
                len: read_length(r, lvt)?,
            }),
        }
    }
}

fn write_tag_byte(w: &mut Writer<'_>, tag_num: u8, low_bits: u8) -> Result<(), EncodeError> {
    if tag_num > MAX_TAG_NUMBER {
        return Err(EncodeError::ValueOutOfRange);
    }
    if tag_num < EXTENDED_TAG_NUMBER {
        w.write_u8((tag_num << 4) | low_bits)
    } else {
        w.write_u8((EXTENDED_TAG_NUMBER << 4) | low_bits)?;
        w.write_u8(tag_num)
    }
}

fn write_header(w: &mut Writer<'_>, tag_num: u8, class: u8, len: u32) -> Result<(), EncodeError> {
    if len <= 4 {
        return write_tag_byte(w, tag_num, class | len as u8);
    }
    write_tag_byte(w, tag_num, class | LVT_EXTENDED_LENGTH)?;
    match len {
        5..=253 => w.write_u8(len as u8),
        254..=0xFFFF => {
            w.write_u8(254)?;
            w.write_be_u16(len as u16)
        }
        _ => {
            w.write_u8(255)?;
            w.write_be_u32(len)
        }
    }
}

fn write_marker(w: &mut Writer<'_>, tag_num: u8, lvt: u8) -> Result<(), EncodeError> {
    write_tag_byte(w, tag_num, CLASS_CONTEXT | lvt)
}

fn read_length(r: &mut Reader<'_>, lvt: u8) -> Result<u32, DecodeError> {
    match lvt {
        0..=4 => Ok(u32::from(lvt)),
        LVT_EXTENDED_LENGTH => match r.read_u8()? {
            254 => Ok(u32::from(r.read_be_u16()?)),
            255 => r.read_be_u32(),
            short => Ok(u32::from(short)),
        },
        _ => Err(DecodeError::InvalidLength),
    }
}

const BOOL_FALSE: &[u8] = &[0];
const BOOL_TRUE: &[u8] = &[1];

/// One primitive tag together with its payload.
///
/// `number` is the application type code for [`TagClass::Application`] and the
/// slot number for [`TagClass::Context`]. An application boolean has no payload
/// on the wire; its value is represented here as a single `0`/`1` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTag<'a> {
    pub number: u8,
    pub class: TagClass,
    pub value: &'a [u8],
}

impl<'a> RawTag<'a> {
    pub const fn application(tag: AppTag, value: &'a [u8]) -> Self {
        Self {
            number: tag as u8,
            class: TagClass::Application,
            value,
        }
    }

    pub const fn context(number: u8, value: &'a [u8]) -> Self {
        Self {
            number,
            class: TagClass::Context,
            value,
        }
    }

    /// The header that introduces this tag on the wire.
    pub fn header(&self) -> Result<Tag, EncodeError> {
        let len = u32::try_from(self.value.len()).map_err(|_| EncodeError::InvalidLength)?;
        match self.class {
            TagClass::Context => Ok(Tag::Context {
                tag_num: self.number,
                len,
            }),
            TagClass::Application => {
                let tag = AppTag::from_u8(self.number).map_err(|_| EncodeError::ValueOutOfRange)?;
                if tag == AppTag::Boolean {
                    return match self.value {
                        [b @ (0 | 1)] => Ok(Tag::Application {
                            tag,
                            len: u32::from(*b),
                        }),
                        _ => Err(EncodeError::InvalidLength),
                    };
                }
                Ok(Tag::Application { tag, len })
            }
        }
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let header = self.header()?;
        header.encode(w)?;
        if matches!(header, Tag::Application { tag: AppTag::Boolean, .. }) {
            return Ok(());
        }
        w.write_all(self.value)
    }

    /// Reads one primitive tag; any overrun reports [`DecodeError::MalformedTag`].
    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let header = Tag::decode(r).map_err(|_| DecodeError::MalformedTag)?;
        let (number, class, len) = match header {
            Tag::Application {
                tag: AppTag::Boolean,
                len,
            } => {
                let value = match len {
                    0 => BOOL_FALSE,
                    1 => BOOL_TRUE,
                    _ => return Err(DecodeError::MalformedTag),
                };
                return Ok(Self::application(AppTag::Boolean, value));
            }
            Tag::Application { tag, len } => (tag as u8, TagClass::Application, len),
            Tag::Context { tag_num, len } => (tag_num, TagClass::Context, len),
            Tag::Opening { .. } | Tag::Closing { .. } => return Err(DecodeError::MalformedTag),
        };
        let len = usize::try_from(len).map_err(|_| DecodeError::MalformedTag)?;
        let value = r.read_exact(len).map_err(|_| DecodeError::MalformedTag)?;
        Ok(Self {
            number,
            class,
            value,
        })
    }

    /// Byte count this tag occupies when encoded.
    pub fn encoded_len(&self) -> usize {
        let number_len = if self.number < EXTENDED_TAG_NUMBER { 1 } else { 2 };
        if self.class == TagClass::Application && self.number == AppTag::Boolean as u8 {
            return number_len;
        }
        let len = self.value.len();
        let length_len = match len {
            0..=4 => 0,
            5..=253 => 1,
            254..=0xFFFF => 3,
            _ => 5,
        };
        number_len + length_len + len
    }
}

/// Decodes the primitive tag starting at `offset`, returning it and the number
/// of bytes it occupied.
pub fn decode_tag(buf: &[u8], offset: usize) -> Result<(RawTag<'_>, usize), DecodeError> {
    let tail = buf.get(offset..).ok_or(DecodeError::MalformedTag)?;
    let mut r = Reader::new(tail);
    let tag = RawTag::decode(&mut r)?;
    Ok((tag, r.position()))
}

#[cfg(test)]
mod tests {
    use super::{decode_tag, AppTag, RawTag, Tag, TagClass};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::{DecodeError, EncodeError};
    use proptest::prelude::*;

    fn encode(tag: Tag) -> ([u8; 16], usize) {
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        tag.encode(&mut w).unwrap();
        let n = w.position();
        (buf, n)
    }

    #[test]
    fn header_bytes_match_known_encodings() {
        let (buf, n) = encode(Tag::Context { tag_num: 5, len: 0 });
        assert_eq!(&buf[..n], &[0x58]);

        let (buf, n) = encode(Tag::Application {
            tag: AppTag::Real,
            len: 4,
        });
        assert_eq!(&buf[..n], &[0x44]);

        let (buf, n) = encode(Tag::Opening { tag_num: 3 });
        assert_eq!(&buf[..n], &[0x3E]);

        let (buf, n) = encode(Tag::Closing { tag_num: 3 });
        assert_eq!(&buf[..n], &[0x3F]);

        let (buf, n) = encode(Tag::Context { tag_num: 4, len: 1 });
        assert_eq!(&buf[..n], &[0x49]);
    }

    #[test]
    fn extended_number_and_lengths() {
        let (buf, n) = encode(Tag::Context {
            tag_num: 30,
            len: 300,
        });
        assert_eq!(&buf[..n], &[0xFD, 30, 254, 0x01, 0x2C]);
        let mut r = Reader::new(&buf[..n]);
        assert_eq!(
            Tag::decode(&mut r).unwrap(),
            Tag::Context {
                tag_num: 30,
                len: 300
            }
        );

        let (buf, n) = encode(Tag::Context {
            tag_num: 1,
            len: 70_000,
        });
        assert_eq!(&buf[..n], &[0x1D, 255, 0x00, 0x01, 0x11, 0x70]);
    }

    #[test]
    fn reserved_tag_number_is_rejected() {
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            Tag::Context { tag_num: 255, len: 0 }.encode(&mut w),
            Err(EncodeError::ValueOutOfRange)
        );
        let mut r = Reader::new(&[0xF8, 0xFF]);
        assert_eq!(Tag::decode(&mut r), Err(DecodeError::InvalidTag));
    }

    #[test]
    fn zero_length_context_tag_decodes_to_empty_value() {
        let (tag, used) = decode_tag(&[0x00, 0x58, 0x3F], 1).unwrap();
        assert_eq!(tag, RawTag::context(5, &[]));
        assert_eq!(used, 1);
    }

    #[test]
    fn application_boolean_carries_value_in_header() {
        let (tag, used) = decode_tag(&[0x11], 0).unwrap();
        assert_eq!(tag.value, &[1]);
        assert_eq!(used, 1);

        let mut buf = [0u8; 2];
        let mut w = Writer::new(&mut buf);
        RawTag::application(AppTag::Boolean, &[0]).encode(&mut w).unwrap();
        assert_eq!(w.as_written(), &[0x10]);
    }

    #[test]
    fn overruns_are_malformed() {
        // Real declares four bytes, only two follow.
        assert_eq!(
            decode_tag(&[0x44, 0x42, 0x91], 0).unwrap_err(),
            DecodeError::MalformedTag
        );
        // Extended tag number byte missing.
        assert_eq!(decode_tag(&[0xF9], 0).unwrap_err(), DecodeError::MalformedTag);
        // Extended length byte missing.
        assert_eq!(decode_tag(&[0x1D], 0).unwrap_err(), DecodeError::MalformedTag);
        // u16 length truncated.
        assert_eq!(
            decode_tag(&[0x1D, 254, 0x01], 0).unwrap_err(),
            DecodeError::MalformedTag
        );
        assert_eq!(decode_tag(&[0x19, 0x55], 3).unwrap_err(), DecodeError::MalformedTag);
    }

    #[test]
    fn opening_and_closing_tags_carry_no_value() {
        assert_eq!(decode_tag(&[0x3E], 0).unwrap_err(), DecodeError::MalformedTag);
        assert_eq!(decode_tag(&[0x3F], 0).unwrap_err(), DecodeError::MalformedTag);
    }

    fn raw_tag_strategy() -> impl Strategy<Value = (u8, bool, Vec<u8>)> {
        (
            0u8..=254,
            any::<bool>(),
            prop::collection::vec(any::<u8>(), 0..400),
        )
    }

    proptest! {
        #[test]
        fn raw_tags_survive_encode_decode((number, context, payload) in raw_tag_strategy()) {
            let tag = if context {
                RawTag::context(number, &payload)
            } else {
                // Boolean has its own header-only form; keep the payload path here.
                let app = match number % 13 {
                    1 => AppTag::OctetString,
                    n => AppTag::from_u8(n).unwrap(),
                };
                RawTag::application(app, &payload)
            };
            let mut buf = vec![0u8; payload.len() + 8];
            let mut w = Writer::new(&mut buf);
            tag.encode(&mut w).unwrap();
            let written = w.position();
            prop_assert_eq!(written, tag.encoded_len());

            let (decoded, used) = decode_tag(&buf[..written], 0).unwrap();
            prop_assert_eq!(used, written);
            prop_assert_eq!(decoded.number, tag.number);
            let class = if context {
                TagClass::Context
            } else {
                TagClass::Application
            };
            prop_assert_eq!(decoded.class, class);
            prop_assert_eq!(decoded.value, tag.value);
        }
    }
}
