use super::error::UnescapeError;
use super::layout::{ESCAPE_MARKER, ESCAPE_PREFIX, hex_nibble, must_escape};

/// Selects how much the decoder trusts its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Input comes from a log nginx wrote; only escapes are interpreted.
    #[default]
    Permissive,
    /// Input is untrusted; every raw byte is checked against the escape table.
    Strict,
}

impl Mode {
    pub fn is_strict(self) -> bool {
        matches!(self, Mode::Strict)
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Literal,
    /// Saw `\`, expecting `x`.
    Prefix,
    /// Saw `\x`, expecting the high hex digit.
    HighNibble,
    /// Saw `\xH`, carrying the shifted high nibble.
    LowNibble(u8),
}

/// Unescapes a nginx log field written from a trusted source.
///
/// # Examples
/// ```
/// use ngx_unescape_core::unescape;
///
/// assert_eq!(unescape(br"foo\x09.bar")?, b"foo\t.bar");
/// # Ok::<(), ngx_unescape_core::UnescapeError>(())
/// ```
pub fn unescape(input: &[u8]) -> Result<Vec<u8>, UnescapeError> {
    decode(input, Mode::Permissive)
}

/// Unescapes a nginx log field from an untrusted source, rejecting raw bytes
/// that `ngx_http_log_module` would have escaped.
///
/// # Examples
/// ```
/// use ngx_unescape_core::{ErrorKind, unescape_strict};
///
/// let err = unescape_strict(b"foo\0bar").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::NotEscaped);
/// assert_eq!(err.partial(), b"foo");
/// ```
pub fn unescape_strict(input: &[u8]) -> Result<Vec<u8>, UnescapeError> {
    decode(input, Mode::Strict)
}

/// Decodes every `\xHH` sequence in `input` in a single left-to-right pass.
///
/// A field that ends inside an escape sequence (`\`, `\x` or `\xH`) loses the
/// incomplete tail without an error. nginx never writes such a field, so only
/// truncated input hits this path.
pub fn decode(input: &[u8], mode: Mode) -> Result<Vec<u8>, UnescapeError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    // Strict mode has to look at every byte anyway.
    if !mode.is_strict() && !input.contains(&ESCAPE_PREFIX) {
        return Ok(input.to_vec());
    }

    let mut out = Vec::with_capacity(input.len());
    let mut state = ScanState::Literal;
    for (offset, &byte) in input.iter().enumerate() {
        if mode.is_strict() && must_escape(byte) {
            return Err(UnescapeError::NotEscaped {
                offset,
                byte,
                partial: finish(out),
            });
        }
        state = match state {
            ScanState::Literal if byte == ESCAPE_PREFIX => ScanState::Prefix,
            ScanState::Literal => {
                out.push(byte);
                ScanState::Literal
            }
            ScanState::Prefix if byte == ESCAPE_MARKER => ScanState::HighNibble,
            ScanState::Prefix => return Err(short_scan(offset, out)),
            ScanState::HighNibble => {
                let Some(nibble) = hex_nibble(byte) else {
                    return Err(short_scan(offset, out));
                };
                ScanState::LowNibble(nibble << 4)
            }
            ScanState::LowNibble(high) => {
                let Some(nibble) = hex_nibble(byte) else {
                    return Err(short_scan(offset, out));
                };
                out.push(high | nibble);
                ScanState::Literal
            }
        };
    }
    Ok(finish(out))
}

fn short_scan(offset: usize, out: Vec<u8>) -> UnescapeError {
    UnescapeError::ShortScan {
        offset,
        partial: finish(out),
    }
}

fn finish(mut out: Vec<u8>) -> Vec<u8> {
    out.shrink_to_fit();
    out
}
