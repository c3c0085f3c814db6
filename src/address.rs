//! Format checks for the hex strings that cross the wire.
//!
//! - address: `0x` + 40 hex characters (any case, no checksum enforcement)
//! - signature: `0x` + 130 hex characters (65 bytes, `r || s || v`)
//!
//! Address comparison is always case-insensitive.

/// Length of a textual address including the `0x` prefix.
pub const ADDRESS_HEX_LEN: usize = 42;

/// Length of a textual 65-byte signature including the `0x` prefix.
pub const SIGNATURE_HEX_LEN: usize = 132;

/// Check if a string is an Ethereum-style address: `0x` + 40 hex characters.
///
/// Mixed case is accepted; EIP-55 checksum casing is not verified.
pub fn validate_address(address: &str) -> bool {
    is_prefixed_hex(address, ADDRESS_HEX_LEN)
}

/// Check if a string has the shape of a recoverable signature: `0x` + 130 hex characters.
pub fn validate_signature_format(signature: &str) -> bool {
    is_prefixed_hex(signature, SIGNATURE_HEX_LEN)
}

/// Compare two addresses ignoring case.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Strip an optional `0x` / `0X` prefix.
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn is_prefixed_hex(s: &str, len: usize) -> bool {
    s.len() == len
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}
