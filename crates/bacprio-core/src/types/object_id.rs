use core::fmt;
use core::str::FromStr;

use crate::types::object_type::MAX_OBJECT_TYPE;
use crate::types::ObjectType;
use crate::ParseError;

/// Highest instance number the 22-bit field can hold.
pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

/// A packed BACnet object identifier: object type in the upper 10 bits,
/// instance number in the lower 22, as it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u32);

impl ObjectId {
    /// Packs a type and instance, masking each to its field width.
    ///
    /// Use [`ObjectId::try_new`] for values that come from outside the program.
    pub const fn new(object_type: ObjectType, instance: u32) -> Self {
        Self((((object_type.to_u16() as u32) & 0x03FF) << 22) | (instance & MAX_INSTANCE))
    }

    /// Packs a type and instance, rejecting values that do not fit their fields.
    pub const fn try_new(object_type: ObjectType, instance: u32) -> Result<Self, ParseError> {
        if object_type.to_u16() > MAX_OBJECT_TYPE || instance > MAX_INSTANCE {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self::new(object_type, instance))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn object_type(self) -> ObjectType {
        ObjectType::from_u16(((self.0 >> 22) & 0x03FF) as u16)
    }

    pub const fn instance(self) -> u32 {
        self.0 & MAX_INSTANCE
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type(), self.instance())
    }
}

/// Parses `<type>:<instance>` or `<type>,<instance>`, e.g. `analog-output:1`,
/// `analogOutput,1` or `1:1`.
impl FromStr for ObjectId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (object_type, instance) = s
            .split_once([':', ','])
            .ok_or(ParseError::MissingInstance)?;
        let object_type: ObjectType = object_type.parse()?;
        let instance = instance.trim();
        if instance.is_empty() || !instance.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidNumber);
        }
        let instance: u32 = instance.parse().map_err(|_| ParseError::OutOfRange)?;
        Self::try_new(object_type, instance)
    }
}
