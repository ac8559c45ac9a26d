use crate::encoding::tag::AppTag;
use crate::types::ObjectId;

/// A primitive BACnet value borrowed from a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataValue<'a> {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(&'a [u8]),
    CharacterString(&'a str),
    Enumerated(u32),
    ObjectId(ObjectId),
}

impl DataValue<'_> {
    /// Application tag this value is encoded under.
    pub const fn app_tag(&self) -> AppTag {
        match self {
            Self::Null => AppTag::Null,
            Self::Boolean(_) => AppTag::Boolean,
            Self::Unsigned(_) => AppTag::UnsignedInt,
            Self::Signed(_) => AppTag::SignedInt,
            Self::Real(_) => AppTag::Real,
            Self::Double(_) => AppTag::Double,
            Self::OctetString(_) => AppTag::OctetString,
            Self::CharacterString(_) => AppTag::CharacterString,
            Self::Enumerated(_) => AppTag::Enumerated,
            Self::ObjectId(_) => AppTag::ObjectId,
        }
    }
}
