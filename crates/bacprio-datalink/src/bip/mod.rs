/// BVLC header codec.
pub mod bvlc;
/// UDP transport.
pub mod transport;
