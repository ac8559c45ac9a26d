use bacprio_core::encoding::tag::AppTag;
use bacprio_core::types::{DataValue, ObjectId};
use core::fmt;

/// Owned counterpart of [`DataValue`], returned once the receive buffer is reused.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
pub enum ClientDataValue {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    Enumerated(u32),
    ObjectId(ObjectId),
}

impl ClientDataValue {
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

    pub const fn as_real(&self) -> Option<f32> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrows the value back for encoding, e.g. to write it elsewhere.
    pub fn as_data_value(&self) -> DataValue<'_> {
        match self {
            Self::Null => DataValue::Null,
            Self::Boolean(v) => DataValue::Boolean(*v),
            Self::Unsigned(v) => DataValue::Unsigned(*v),
            Self::Signed(v) => DataValue::Signed(*v),
            Self::Real(v) => DataValue::Real(*v),
            Self::Double(v) => DataValue::Double(*v),
            Self::OctetString(v) => DataValue::OctetString(v),
            Self::CharacterString(v) => DataValue::CharacterString(v),
            Self::Enumerated(v) => DataValue::Enumerated(*v),
            Self::ObjectId(v) => DataValue::ObjectId(*v),
        }
    }
}

impl From<DataValue<'_>> for ClientDataValue {
    fn from(value: DataValue<'_>) -> Self {
        match value {
            DataValue::Null => Self::Null,
            DataValue::Boolean(v) => Self::Boolean(v),
            DataValue::Unsigned(v) => Self::Unsigned(v),
            DataValue::Signed(v) => Self::Signed(v),
            DataValue::Real(v) => Self::Real(v),
            DataValue::Double(v) => Self::Double(v),
            DataValue::OctetString(v) => Self::OctetString(v.to_vec()),
            DataValue::CharacterString(v) => Self::CharacterString(v.to_string()),
            DataValue::Enumerated(v) => Self::Enumerated(v),
            DataValue::ObjectId(v) => Self::ObjectId(v),
        }
    }
}

impl fmt::Display for ClientDataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::OctetString(v) => {
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::CharacterString(v) => write!(f, "{v:?}"),
            Self::Enumerated(v) => write!(f, "enumerated {v}"),
            Self::ObjectId(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientDataValue;
    use bacprio_core::encoding::tag::AppTag;
    use bacprio_core::types::{DataValue, ObjectId, ObjectType};

    #[test]
    fn borrowed_values_become_owned() {
        let v = ClientDataValue::from(DataValue::CharacterString("AHU-1"));
        assert_eq!(v, ClientDataValue::CharacterString("AHU-1".to_string()));
        assert_eq!(v.as_data_value(), DataValue::CharacterString("AHU-1"));
        assert_eq!(v.app_tag(), AppTag::CharacterString);
    }

    #[test]
    fn real_accessor_and_display() {
        let v = ClientDataValue::from(DataValue::Real(72.5));
        assert_eq!(v.as_real(), Some(72.5));
        assert_eq!(v.to_string(), "72.5");
        assert_eq!(ClientDataValue::Null.as_real(), None);
        assert_eq!(ClientDataValue::Null.to_string(), "null");
        assert_eq!(
            ClientDataValue::ObjectId(ObjectId::new(ObjectType::AnalogOutput, 1)).to_string(),
            "analog-output:1"
        );
        assert_eq!(ClientDataValue::OctetString(vec![0xde, 0xad]).to_string(), "dead");
    }
}
