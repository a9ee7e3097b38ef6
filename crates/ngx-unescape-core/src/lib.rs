//! Reverses the escaping nginx applies to variables before writing them to an
//! access log.
//!
//! `ngx_http_log_module` replaces every byte that is unsafe to emit literally
//! (control characters, `"`, `\` and all high-bit bytes) with a `\xHH` escape
//! using uppercase hex digits. This crate turns one such field back into its
//! raw bytes in a single pass.
//!
//! Callers split the log line into fields first and hand each field to the
//! decoder separately. The quote character (`"`, `0x22`) is always escaped by
//! nginx, so it is a safe field delimiter in a custom `log_format`.
//!
//! Two modes are provided:
//! - [`unescape`] trusts the input and only interprets escape sequences.
//! - [`unescape_strict`] additionally rejects any raw byte nginx would have
//!   escaped, which is how corrupted or foreign data is detected.
//!
//! Invariants:
//! - Output is never longer than input.
//! - Decoding never panics; every input yields bytes or an [`UnescapeError`].
//! - On error, the bytes decoded before the failure are kept in the error.
//!
//! # Examples
//! ```
//! use ngx_unescape_core::unescape;
//!
//! let out = unescape(br"foo\x22.bar\x5C?baz")?;
//! assert_eq!(out, br#"foo".bar\?baz"#);
//! # Ok::<(), ngx_unescape_core::UnescapeError>(())
//! ```

pub mod escape;

pub use escape::decoder::{Mode, decode, unescape, unescape_strict};
pub use escape::error::{ErrorKind, UnescapeError};
pub use escape::layout::{HEX_DIGITS, must_escape};
