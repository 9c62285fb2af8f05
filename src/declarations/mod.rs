//! Declaration factories, one per value type.
//!
//! Each factory takes the environment, a variable name, and a description,
//! and returns a [`DeclarationBuilder`](crate::DeclarationBuilder) whose
//! type-specific options are inherent methods.

mod big_integer;
mod binary;
mod boolean;
mod duration;
mod enumeration;
mod integer;
mod kubernetes_address;
mod network_port_number;
mod number;
mod string;
mod url;

pub use big_integer::{big_integer, BigIntegerKind};
pub use binary::{binary, BinaryEncoding, BinaryKind};
pub use boolean::{boolean, BooleanKind};
pub use duration::{duration, format_duration, parse_duration, DurationKind};
pub use enumeration::{enumeration, EnumerationKind};
pub use integer::{integer, IntegerKind};
pub use kubernetes_address::{
    kubernetes_address, service_variable_names, KubernetesAddress, KubernetesAddressBuilder,
};
pub use network_port_number::{network_port_number, NetworkPortNumberKind};
pub use number::{number, NumberKind};
pub use string::{string, StringKind};
pub use self::url::{url, UrlKind};

/// Longest generated example, in characters or bytes. Longer bounds get no
/// generated example at that length.
pub(crate) const MAX_EXAMPLE_LENGTH: usize = 64;

/// Parse an integer with an optional sign and `0x`/`0o`/`0b` prefix.
pub(crate) fn parse_prefixed_integer(raw: &str) -> Option<i128> {
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (radix, digits) = match body.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => (16, &body[2..]),
        Some("0o") => (8, &body[2..]),
        Some("0b") => (2, &body[2..]),
        _ => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i128::from_str_radix(&format!("{}{}", sign, digits), radix).ok()
}

/// Check that a lower bound does not exceed an upper bound.
pub(crate) fn check_bounds<T: PartialOrd>(min: Option<&T>, max: Option<&T>) -> Result<(), String> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            Err("min must be less than or equal to max".to_string())
        }
        _ => Ok(()),
    }
}
