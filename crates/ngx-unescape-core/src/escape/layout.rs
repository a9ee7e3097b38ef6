/// First byte of every escape sequence.
pub const ESCAPE_PREFIX: u8 = b'\\';
/// Marker that must follow [`ESCAPE_PREFIX`].
pub const ESCAPE_MARKER: u8 = b'x';

/// Hex alphabet used by `ngx_http_log_escape`. Lowercase digits are never
/// emitted, so they are not accepted either.
pub const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes nginx always escapes in log variables, indexed by byte value.
///
/// Mirrors the table in `ngx_http_log_escape` with one change: `\` is allowed
/// raw, so strict validation does not reject an escape prefix before the
/// decoder gets to interpret it.
pub static MUST_ESCAPE: [bool; 256] = build_must_escape();

const fn build_must_escape() -> [bool; 256] {
    let mut table = [false; 256];
    let mut b = 0;
    while b < 256 {
        table[b] = b < 0x20 || b == 0x22 || b >= 0x7f;
        b += 1;
    }
    table
}

/// Reports whether `byte` must never appear unescaped in a nginx log field.
///
/// # Examples
/// ```
/// use ngx_unescape_core::must_escape;
///
/// assert!(must_escape(b'"'));
/// assert!(must_escape(0x00));
/// assert!(!must_escape(b'\\'));
/// assert!(!must_escape(b'a'));
/// ```
#[inline]
pub fn must_escape(byte: u8) -> bool {
    MUST_ESCAPE[byte as usize]
}

/// Nibble value of an uppercase hex digit, `None` for anything else.
#[inline]
pub fn hex_nibble(byte: u8) -> Option<u8> {
    HEX_DIGITS
        .iter()
        .position(|&digit| digit == byte)
        .map(|n| n as u8)
}
