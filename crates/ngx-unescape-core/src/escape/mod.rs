//! nginx log escape decoding.
//!
//! The module follows a layered structure:
//! - `layout`: grammar bytes and the constant lookup tables (source of truth)
//! - `decoder`: the single-pass state machine
//! - `error`: explicit, actionable errors carrying the partial output
//!
//! The escape grammar is exactly `\xHH` with uppercase hex digits. No other
//! short escapes (`\n`, `\t`, ...) exist in nginx logs.

pub mod decoder;
pub mod error;
pub mod layout;
