use core::fmt;
use core::str::FromStr;

use crate::ParseError;

/// BACnet property identifiers.
///
/// The properties a commandable point exposes are named; anything else uses
/// [`Proprietary`](Self::Proprietary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyId {
    AckedTransitions,
    Description,
    EventState,
    ObjectIdentifier,
    ObjectList,
    ObjectName,
    ObjectType,
    OutOfService,
    PresentValue,
    PriorityArray,
    Reliability,
    RelinquishDefault,
    StatusFlags,
    Units,
    VendorName,
    CurrentCommandPriority,
    Proprietary(u32),
}

/// Property identifiers are 22-bit on the wire.
pub const MAX_PROPERTY_ID: u32 = 0x3F_FFFF;

const STANDARD: [PropertyId; 16] = [
    PropertyId::AckedTransitions,
    PropertyId::Description,
    PropertyId::EventState,
    PropertyId::ObjectIdentifier,
    PropertyId::ObjectList,
    PropertyId::ObjectName,
    PropertyId::ObjectType,
    PropertyId::OutOfService,
    PropertyId::PresentValue,
    PropertyId::PriorityArray,
    PropertyId::Reliability,
    PropertyId::RelinquishDefault,
    PropertyId::StatusFlags,
    PropertyId::Units,
    PropertyId::VendorName,
    PropertyId::CurrentCommandPriority,
];

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::AckedTransitions => 0,
            Self::Description => 28,
            Self::EventState => 36,
            Self::ObjectIdentifier => 75,
            Self::ObjectList => 76,
            Self::ObjectName => 77,
            Self::ObjectType => 79,
            Self::OutOfService => 81,
            Self::PresentValue => 85,
            Self::PriorityArray => 87,
            Self::Reliability => 103,
            Self::RelinquishDefault => 104,
            Self::StatusFlags => 111,
            Self::Units => 117,
            Self::VendorName => 121,
            Self::CurrentCommandPriority => 431,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::AckedTransitions,
            28 => Self::Description,
            36 => Self::EventState,
            75 => Self::ObjectIdentifier,
            76 => Self::ObjectList,
            77 => Self::ObjectName,
            79 => Self::ObjectType,
            81 => Self::OutOfService,
            85 => Self::PresentValue,
            87 => Self::PriorityArray,
            103 => Self::Reliability,
            104 => Self::RelinquishDefault,
            111 => Self::StatusFlags,
            117 => Self::Units,
            121 => Self::VendorName,
            431 => Self::CurrentCommandPriority,
            v => Self::Proprietary(v),
        }
    }

    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::AckedTransitions => "acked-transitions",
            Self::Description => "description",
            Self::EventState => "event-state",
            Self::ObjectIdentifier => "object-identifier",
            Self::ObjectList => "object-list",
            Self::ObjectName => "object-name",
            Self::ObjectType => "object-type",
            Self::OutOfService => "out-of-service",
            Self::PresentValue => "present-value",
            Self::PriorityArray => "priority-array",
            Self::Reliability => "reliability",
            Self::RelinquishDefault => "relinquish-default",
            Self::StatusFlags => "status-flags",
            Self::Units => "units",
            Self::VendorName => "vendor-name",
            Self::CurrentCommandPriority => "current-command-priority",
            Self::Proprietary(_) => return None,
        })
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.to_u32()),
        }
    }
}

impl FromStr for PropertyId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let value: u32 = s.parse().map_err(|_| ParseError::OutOfRange)?;
            if value > MAX_PROPERTY_ID {
                return Err(ParseError::OutOfRange);
            }
            return Ok(Self::from_u32(value));
        }
        STANDARD
            .iter()
            .copied()
            .find(|p| p.name().is_some_and(|name| super::ident_matches(s, name)))
            .ok_or(ParseError::UnknownName)
    }
}
