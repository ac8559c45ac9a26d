//! Enumerations carried in confirmed-request headers and in negative responses.

use core::fmt;

/// Maximum APDU length accepted by a device, as the 4-bit header code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MaxApdu {
    UpTo50 = 0,
    UpTo128 = 1,
    UpTo206 = 2,
    UpTo480 = 3,
    UpTo1024 = 4,
    UpTo1476 = 5,
}

impl MaxApdu {
    pub const fn octets(self) -> usize {
        match self {
            Self::UpTo50 => 50,
            Self::UpTo128 => 128,
            Self::UpTo206 => 206,
            Self::UpTo480 => 480,
            Self::UpTo1024 => 1024,
            Self::UpTo1476 => 1476,
        }
    }
}

/// Error class reported in Error PDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorClass {
    Device = 0,
    Object = 1,
    Property = 2,
    Resources = 3,
    Security = 4,
    Services = 5,
    Vt = 6,
    Communication = 7,
}

impl ErrorClass {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Device),
            1 => Some(Self::Object),
            2 => Some(Self::Property),
            3 => Some(Self::Resources),
            4 => Some(Self::Security),
            5 => Some(Self::Services),
            6 => Some(Self::Vt),
            7 => Some(Self::Communication),
            _ => None,
        }
    }
}

/// Error codes a device typically returns for ReadProperty / WriteProperty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Other = 0,
    ConfigurationInProgress = 2,
    DeviceBusy = 3,
    InconsistentParameters = 7,
    InvalidDataType = 9,
    MissingRequiredParameter = 16,
    NoSpaceToWriteProperty = 20,
    PropertyIsNotAList = 22,
    ServiceRequestDenied = 29,
    Timeout = 30,
    UnknownObject = 31,
    UnknownProperty = 32,
    ValueOutOfRange = 37,
    WriteAccessDenied = 40,
    InvalidArrayIndex = 42,
    PropertyIsNotAnArray = 50,
}

impl ErrorCode {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Other,
            2 => Self::ConfigurationInProgress,
            3 => Self::DeviceBusy,
            7 => Self::InconsistentParameters,
            9 => Self::InvalidDataType,
            16 => Self::MissingRequiredParameter,
            20 => Self::NoSpaceToWriteProperty,
            22 => Self::PropertyIsNotAList,
            29 => Self::ServiceRequestDenied,
            30 => Self::Timeout,
            31 => Self::UnknownObject,
            32 => Self::UnknownProperty,
            37 => Self::ValueOutOfRange,
            40 => Self::WriteAccessDenied,
            42 => Self::InvalidArrayIndex,
            50 => Self::PropertyIsNotAnArray,
            _ => return None,
        })
    }
}

/// Reason octet of a Reject PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Other,
    BufferOverflow,
    InconsistentParameters,
    InvalidParameterDataType,
    InvalidTag,
    MissingRequiredParameter,
    ParameterOutOfRange,
    TooManyArguments,
    UndefinedEnumeration,
    UnrecognizedService,
    Proprietary(u8),
}

impl RejectReason {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Other,
            1 => Self::BufferOverflow,
            2 => Self::InconsistentParameters,
            3 => Self::InvalidParameterDataType,
            4 => Self::InvalidTag,
            5 => Self::MissingRequiredParameter,
            6 => Self::ParameterOutOfRange,
            7 => Self::TooManyArguments,
            8 => Self::UndefinedEnumeration,
            9 => Self::UnrecognizedService,
            v => Self::Proprietary(v),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proprietary(v) => write!(f, "reject reason {v}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// Reason octet of an Abort PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Other,
    BufferOverflow,
    InvalidApduInThisState,
    PreemptedByHigherPriorityTask,
    SegmentationNotSupported,
    SecurityError,
    InsufficientSecurity,
    WindowSizeOutOfRange,
    ApplicationExceededReplyTime,
    OutOfResources,
    TsmTimeout,
    ApduTooLong,
    Proprietary(u8),
}

impl AbortReason {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Other,
            1 => Self::BufferOverflow,
            2 => Self::InvalidApduInThisState,
            3 => Self::PreemptedByHigherPriorityTask,
            4 => Self::SegmentationNotSupported,
            5 => Self::SecurityError,
            6 => Self::InsufficientSecurity,
            7 => Self::WindowSizeOutOfRange,
            8 => Self::ApplicationExceededReplyTime,
            9 => Self::OutOfResources,
            10 => Self::TsmTimeout,
            11 => Self::ApduTooLong,
            v => Self::Proprietary(v),
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proprietary(v) => write!(f, "abort reason {v}"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}
