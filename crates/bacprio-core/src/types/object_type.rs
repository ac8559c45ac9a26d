use core::fmt;
use core::str::FromStr;

use crate::ParseError;

/// BACnet object types.
///
/// Standard types are named variants; vendor-specific types use
/// [`Proprietary`](Self::Proprietary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Calendar,
    Command,
    Device,
    EventEnrollment,
    File,
    Group,
    Loop,
    MultiStateInput,
    MultiStateOutput,
    NotificationClass,
    Program,
    Schedule,
    Averaging,
    MultiStateValue,
    TrendLog,
    Accumulator,
    PulseConverter,
    IntegerValue,
    LargeAnalogValue,
    PositiveIntegerValue,
    Proprietary(u16),
}

/// Highest value the 10-bit object type field can hold.
pub const MAX_OBJECT_TYPE: u16 = 0x03FF;

const STANDARD: [ObjectType; 26] = [
    ObjectType::AnalogInput,
    ObjectType::AnalogOutput,
    ObjectType::AnalogValue,
    ObjectType::BinaryInput,
    ObjectType::BinaryOutput,
    ObjectType::BinaryValue,
    ObjectType::Calendar,
    ObjectType::Command,
    ObjectType::Device,
    ObjectType::EventEnrollment,
    ObjectType::File,
    ObjectType::Group,
    ObjectType::Loop,
    ObjectType::MultiStateInput,
    ObjectType::MultiStateOutput,
    ObjectType::NotificationClass,
    ObjectType::Program,
    ObjectType::Schedule,
    ObjectType::Averaging,
    ObjectType::MultiStateValue,
    ObjectType::TrendLog,
    ObjectType::Accumulator,
    ObjectType::PulseConverter,
    ObjectType::IntegerValue,
    ObjectType::LargeAnalogValue,
    ObjectType::PositiveIntegerValue,
];

impl ObjectType {
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::AnalogInput => 0,
            Self::AnalogOutput => 1,
            Self::AnalogValue => 2,
            Self::BinaryInput => 3,
            Self::BinaryOutput => 4,
            Self::BinaryValue => 5,
            Self::Calendar => 6,
            Self::Command => 7,
            Self::Device => 8,
            Self::EventEnrollment => 9,
            Self::File => 10,
            Self::Group => 11,
            Self::Loop => 12,
            Self::MultiStateInput => 13,
            Self::MultiStateOutput => 14,
            Self::NotificationClass => 15,
            Self::Program => 16,
            Self::Schedule => 17,
            Self::Averaging => 18,
            Self::MultiStateValue => 19,
            Self::TrendLog => 20,
            Self::Accumulator => 23,
            Self::PulseConverter => 24,
            Self::IntegerValue => 45,
            Self::LargeAnalogValue => 46,
            Self::PositiveIntegerValue => 48,
            Self::Proprietary(v) => v,
        }
    }

    /// Values without a standard name become [`Proprietary`](Self::Proprietary).
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::AnalogInput,
            1 => Self::AnalogOutput,
            2 => Self::AnalogValue,
            3 => Self::BinaryInput,
            4 => Self::BinaryOutput,
            5 => Self::BinaryValue,
            6 => Self::Calendar,
            7 => Self::Command,
            8 => Self::Device,
            9 => Self::EventEnrollment,
            10 => Self::File,
            11 => Self::Group,
            12 => Self::Loop,
            13 => Self::MultiStateInput,
            14 => Self::MultiStateOutput,
            15 => Self::NotificationClass,
            16 => Self::Program,
            17 => Self::Schedule,
            18 => Self::Averaging,
            19 => Self::MultiStateValue,
            20 => Self::TrendLog,
            23 => Self::Accumulator,
            24 => Self::PulseConverter,
            45 => Self::IntegerValue,
            46 => Self::LargeAnalogValue,
            48 => Self::PositiveIntegerValue,
            v => Self::Proprietary(v),
        }
    }

    /// Kebab-case name of a standard type.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::AnalogInput => "analog-input",
            Self::AnalogOutput => "analog-output",
            Self::AnalogValue => "analog-value",
            Self::BinaryInput => "binary-input",
            Self::BinaryOutput => "binary-output",
            Self::BinaryValue => "binary-value",
            Self::Calendar => "calendar",
            Self::Command => "command",
            Self::Device => "device",
            Self::EventEnrollment => "event-enrollment",
            Self::File => "file",
            Self::Group => "group",
            Self::Loop => "loop",
            Self::MultiStateInput => "multi-state-input",
            Self::MultiStateOutput => "multi-state-output",
            Self::NotificationClass => "notification-class",
            Self::Program => "program",
            Self::Schedule => "schedule",
            Self::Averaging => "averaging",
            Self::MultiStateValue => "multi-state-value",
            Self::TrendLog => "trend-log",
            Self::Accumulator => "accumulator",
            Self::PulseConverter => "pulse-converter",
            Self::IntegerValue => "integer-value",
            Self::LargeAnalogValue => "large-analog-value",
            Self::PositiveIntegerValue => "positive-integer-value",
            Self::Proprietary(_) => return None,
        })
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.to_u16()),
        }
    }
}

/// Accepts `analog-output`, `analogOutput`, `ANALOG_OUTPUT` or a number.
impl FromStr for ObjectType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let value: u16 = s.parse().map_err(|_| ParseError::OutOfRange)?;
            if value > MAX_OBJECT_TYPE {
                return Err(ParseError::OutOfRange);
            }
            return Ok(Self::from_u16(value));
        }
        STANDARD
            .iter()
            .copied()
            .find(|t| t.name().is_some_and(|name| super::ident_matches(s, name)))
            .ok_or(ParseError::UnknownName)
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectType;
    use crate::ParseError;

    #[test]
    fn numeric_mapping_is_symmetric() {
        for value in 0..=60u16 {
            assert_eq!(ObjectType::from_u16(value).to_u16(), value);
        }
        assert_eq!(ObjectType::from_u16(1), ObjectType::AnalogOutput);
        assert_eq!(ObjectType::from_u16(600), ObjectType::Proprietary(600));
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("analog-output".parse(), Ok(ObjectType::AnalogOutput));
        assert_eq!("analogOutput".parse(), Ok(ObjectType::AnalogOutput));
        assert_eq!("8".parse(), Ok(ObjectType::Device));
        assert_eq!("700".parse(), Ok(ObjectType::Proprietary(700)));
        assert_eq!("1024".parse::<ObjectType>(), Err(ParseError::OutOfRange));
        assert_eq!("thermostat".parse::<ObjectType>(), Err(ParseError::UnknownName));
    }

    #[test]
    fn displays_kebab_names() {
        assert_eq!(ObjectType::MultiStateValue.to_string(), "multi-state-value");
        assert_eq!(ObjectType::Proprietary(700).to_string(), "700");
    }
}
