use thiserror::Error;

/// Errors returned by the decoder.
///
/// Both variants keep the bytes decoded before the failure, so callers can
/// still inspect or log the readable prefix of a broken field.
///
/// # Examples
/// ```
/// use ngx_unescape_core::{ErrorKind, unescape};
///
/// let err = unescape(br"malformed line \2, here").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ShortScan);
/// assert_eq!(err.partial(), b"malformed line ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    /// The `\xHH` grammar was violated: the `x` marker is missing, or one of
    /// the two following bytes is not an uppercase hex digit.
    #[error("unescape: malformed escape sequence at offset {offset}")]
    ShortScan { offset: usize, partial: Vec<u8> },
    /// Strict mode only: a raw byte appeared that nginx always escapes.
    #[error("unescape: input not properly escaped: byte {byte:#04x} at offset {offset}")]
    NotEscaped {
        offset: usize,
        byte: u8,
        partial: Vec<u8>,
    },
}

/// Error category without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShortScan,
    NotEscaped,
}

impl UnescapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnescapeError::ShortScan { .. } => ErrorKind::ShortScan,
            UnescapeError::NotEscaped { .. } => ErrorKind::NotEscaped,
        }
    }

    /// Index of the offending byte in the input.
    pub fn offset(&self) -> usize {
        match self {
            UnescapeError::ShortScan { offset, .. } | UnescapeError::NotEscaped { offset, .. } => {
                *offset
            }
        }
    }

    /// Output decoded before the failure.
    pub fn partial(&self) -> &[u8] {
        match self {
            UnescapeError::ShortScan { partial, .. }
            | UnescapeError::NotEscaped { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> Vec<u8> {
        match self {
            UnescapeError::ShortScan { partial, .. }
            | UnescapeError::NotEscaped { partial, .. } => partial,
        }
    }
}
