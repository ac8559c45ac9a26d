pub mod data_value;
pub mod object_id;
pub mod object_type;
pub mod property_id;
pub mod spec;

pub use data_value::DataValue;
pub use object_id::ObjectId;
pub use object_type::ObjectType;
pub use property_id::PropertyId;
pub use spec::{AbortReason, ErrorClass, ErrorCode, MaxApdu, RejectReason};

/// Compares an identifier typed by a user against a kebab-case name, ignoring
/// case and treating `-`, `_` and camelCase boundaries alike.
pub(crate) fn ident_matches(input: &str, kebab: &str) -> bool {
    let mut a = input.bytes().filter(|b| *b != b'-' && *b != b'_');
    let mut b = kebab.bytes().filter(|b| *b != b'-');
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(&y) => {}
            _ => return false,
        }
    }
}
