use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall,
    ValueOutOfRange,
    InvalidLength,
    Unsupported,
    Message(&'static str),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::Unsupported => f.write_str("operation unsupported"),
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    Unsupported,
    /// A tag header or its payload runs past the end of the buffer, or the
    /// tag is an opening/closing marker where a value was expected.
    MalformedTag,
    /// A response APDU is truncated or structurally invalid.
    MalformedApdu,
    /// The tag does not carry the requested primitive type.
    TypeMismatch,
    /// The service choice is neither ReadProperty nor WriteProperty.
    UnsupportedService(u8),
    Message(&'static str),
}

impl DecodeError {
    /// Collapses low-level framing errors into [`DecodeError::MalformedApdu`],
    /// keeping the errors that already describe the APDU's content.
    pub const fn into_apdu_error(self) -> Self {
        match self {
            Self::TypeMismatch | Self::UnsupportedService(_) | Self::MalformedApdu => self,
            _ => Self::MalformedApdu,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::InvalidTag => f.write_str("invalid tag"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::Unsupported => f.write_str("operation unsupported"),
            Self::MalformedTag => f.write_str("malformed tag"),
            Self::MalformedApdu => f.write_str("malformed apdu"),
            Self::TypeMismatch => f.write_str("value type mismatch"),
            Self::UnsupportedService(choice) => write!(f, "unsupported service choice {choice}"),
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Failure to parse an identifier from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    UnknownName,
    InvalidNumber,
    OutOfRange,
    MissingInstance,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownName => f.write_str("unknown identifier name"),
            Self::InvalidNumber => f.write_str("invalid number"),
            Self::OutOfRange => f.write_str("identifier out of range"),
            Self::MissingInstance => f.write_str("expected <type>:<instance>"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
