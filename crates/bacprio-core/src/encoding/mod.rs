/// Integer, real and object-identifier content encoders plus context-tag helpers.
pub mod primitives;
/// Zero-copy byte reader.
pub mod reader;
/// BACnet tag headers and decoded wire tags.
pub mod tag;
/// Byte writer over a caller-owned buffer.
pub mod writer;
