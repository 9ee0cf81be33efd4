//! Warnings emitted by the lenient wire decoder.
//!
//! Decoding never fails on bad data inside an otherwise valid document: a
//! malformed code degrades to [`GENERIC`](crate::definitions::GENERIC), an
//! unusable nested entry is dropped. Each degradation is reported here as a
//! structured `tracing` event at `WARN` level under the target
//! [`WIRE_TARGET`].
//!
//! # Fields
//!
//! | Field | Content |
//! |---|---|
//! | `raw` | offending input, truncated to [`MAX_FIELD_OUTPUT_LEN`] bytes |
//! | `reason` | why it was rejected |
//! | `fallback` | what was used instead (code string, `"dropped"` or `"raw text"`) |
//!
//! Input comes from the network, so every echoed value is bounded before it
//! reaches the subscriber.
//!
//! The library never installs a subscriber; without one these events are
//! free.

use std::borrow::Cow;
use std::fmt;

use crate::codes::ErrorCodeViolation;
use crate::definitions;

/// `tracing` target of every decoder warning.
pub const WIRE_TARGET: &str = "coded_errors::wire";

/// Maximum length for any echoed field (DoS prevention).
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// A degradation performed by the decoder.
///
/// Borrows the offending input; build it, emit it, drop it.
#[derive(Debug, Clone, Copy)]
pub enum WireWarning<'a> {
    /// A code string that is not `<name>-<integer>`.
    MalformedCode {
        raw: &'a str,
        reason: &'a ErrorCodeViolation,
    },
    /// A code that is not a JSON string at all.
    NonStringCode { kind: &'static str },
    /// A nested entry that is neither an error object nor a string.
    DroppedNested { kind: &'static str, raw: &'a str },
    /// A stack trace whose `trace` is not base64; its text is kept as is.
    UndecodableTrace { raw: &'a str },
}

impl WireWarning<'_> {
    /// Report through `tracing`.
    pub fn emit(&self) {
        match self {
            Self::MalformedCode { raw, reason } => tracing::warn!(
                target: WIRE_TARGET,
                raw = %truncate_with_indicator(raw),
                reason = %reason,
                fallback = %definitions::GENERIC,
                "malformed error code, falling back to generic"
            ),
            Self::NonStringCode { kind } => tracing::warn!(
                target: WIRE_TARGET,
                raw = %kind,
                reason = "error code is not a string",
                fallback = %definitions::GENERIC,
                "malformed error code, falling back to generic"
            ),
            Self::DroppedNested { kind, raw } => tracing::warn!(
                target: WIRE_TARGET,
                raw = %truncate_with_indicator(raw),
                reason = %kind,
                fallback = "dropped",
                "unsupported nested error entry dropped"
            ),
            Self::UndecodableTrace { raw } => tracing::warn!(
                target: WIRE_TARGET,
                raw = %truncate_with_indicator(raw),
                reason = "stack trace is not base64",
                fallback = "raw text",
                "undecodable stack trace kept as text"
            ),
        }
    }

    /// Write a single-line rendering without intermediate allocation.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::MalformedCode { raw, reason } => write!(
                f,
                "malformed error code raw='{}' reason='{}' fallback='{}'",
                truncate_with_indicator(raw),
                reason,
                definitions::GENERIC
            ),
            Self::NonStringCode { kind } => write!(
                f,
                "malformed error code kind='{}' fallback='{}'",
                kind,
                definitions::GENERIC
            ),
            Self::DroppedNested { kind, raw } => write!(
                f,
                "dropped nested entry raw='{}' kind='{}'",
                truncate_with_indicator(raw),
                kind
            ),
            Self::UndecodableTrace { raw } => write!(
                f,
                "undecodable stack trace raw='{}' fallback='raw text'",
                truncate_with_indicator(raw)
            ),
        }
    }
}

impl fmt::Display for WireWarning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Bound a string for logging.
///
/// Strings over [`MAX_FIELD_OUTPUT_LEN`] bytes are cut on a UTF-8 boundary
/// and end with `...[TRUNCATED]`; the result never exceeds the limit.
pub fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
