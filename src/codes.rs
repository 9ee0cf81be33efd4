//! Error code identity - a symbolic name, a numeric value and an HTTP status.
//!
//! Every [`Error`](crate::Error) carries exactly one `ErrorCode`. Codes are the
//! cross-service contract: service A encodes `"NotFoundError-40404"`, service B
//! decodes it and branches on it.
//!
//! # Numeric Layout
//!
//! Values follow a `<range><http>` convention: the high digits select a
//! subsystem range, the low three digits carry the HTTP status.
//!
//! - **40000 + status**: client-input errors (validation, not-found, auth)
//! - **50000 + status**: system errors (storage, locks, upstreams)
//! - **60000 + status**: streaming/queue processing
//! - **70000 + status**: state-machine transitions
//! - **90000 + status**: generic/bootstrap errors
//!
//! # Construction Policies
//!
//! Two policies coexist and both are supported:
//!
//! - [`ErrorCode::new`]: explicit HTTP status, stored independently of the
//!   value. This is the canonical form used by the predefined catalog.
//! - [`ErrorCode::derived`]: HTTP status computed as `value mod 1000`,
//!   normalized into `0..=999` for negative values.
//!
//! Decoding from the wire always uses the derived policy (see
//! [`codec`](crate::codec)), so explicit statuses that disagree with
//! `value mod 1000` do not survive a JSON round-trip.
//!
//! # Identity
//!
//! Two codes are equal when their `name` and `value` are equal. The HTTP
//! status is informational and excluded from `PartialEq` and `Hash`.
//!
//! # Example
//!
//! ```rust
//! use coded_errors::{ErrorCode, definitions};
//!
//! const ORDER_NOT_FOUND: ErrorCode = ErrorCode::new("OrderNotFoundError", 40404, 404);
//!
//! assert_eq!(ORDER_NOT_FOUND.to_string(), "OrderNotFoundError-40404");
//! assert_eq!(ORDER_NOT_FOUND.http_error(), 404);
//! assert_ne!(ORDER_NOT_FOUND, definitions::NOT_FOUND);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::logging::truncate_with_indicator;

/// Separator between name and value in the wire representation.
pub const CODE_SEPARATOR: char = '-';

/// Compute the HTTP status carried by the low three digits of `value`.
///
/// Negative values are normalized into `0..=999`, so `-5` maps to `995`.
#[inline]
pub const fn http_from_value(value: i64) -> u16 {
    value.rem_euclid(1000) as u16
}

/// Const-evaluable name check used by the const constructors.
///
/// Names must be non-empty and must not contain the wire separator or
/// whitespace.
const fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'-' || bytes[i].is_ascii_whitespace() {
            return false;
        }
        i += 1;
    }
    true
}

// ============================================================================
// Error Code Violations
// ============================================================================

/// Reasons a code cannot be built or parsed on the strict paths.
///
/// The lenient wire decoder never surfaces these; it degrades to
/// [`GENERIC`](crate::definitions::GENERIC) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCodeViolation {
    /// Name is empty.
    EmptyName,
    /// Name contains the `-` separator or whitespace.
    InvalidName { name: String },
    /// Wire form does not split into exactly `<name>-<value>`.
    MalformedWireCode { raw: String },
    /// Value part is not a base-10 integer.
    InvalidValue { raw: String },
}

impl fmt::Display for ErrorCodeViolation {
    /// Echoed input is bounded by
    /// [`truncate_with_indicator`](crate::logging::truncate_with_indicator).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "error code name must not be empty"),
            Self::InvalidName { name } => write!(
                f,
                "error code name '{}' must not contain '-' or whitespace",
                truncate_with_indicator(name)
            ),
            Self::MalformedWireCode { raw } => write!(
                f,
                "error code '{}' is not of the form <name>-<value>",
                truncate_with_indicator(raw)
            ),
            Self::InvalidValue { raw } => write!(
                f,
                "error code value '{}' is not an integer",
                truncate_with_indicator(raw)
            ),
        }
    }
}

impl std::error::Error for ErrorCodeViolation {}

// ============================================================================
// Error Code
// ============================================================================

/// An immutable `(name, value, http_error)` triple identifying an error class.
///
/// Catalog codes are `const` items built with [`ErrorCode::new`]; codes
/// decoded from the wire own their name. Both share this type through
/// `Cow<'static, str>`.
#[derive(Debug, Clone)]
pub struct ErrorCode {
    name: Cow<'static, str>,
    value: i64,
    http_error: u16,
}

impl ErrorCode {
    /// Create a code with an explicit HTTP status (canonical policy).
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or contains `-` or whitespace. In const
    /// contexts this is a compile error.
    #[inline]
    pub const fn new(name: &'static str, value: i64, http_error: u16) -> Self {
        assert!(
            is_valid_name(name),
            "Error code name must be non-empty without '-' or whitespace"
        );

        Self {
            name: Cow::Borrowed(name),
            value,
            http_error,
        }
    }

    /// Create a code whose HTTP status is the low three digits of `value`.
    ///
    /// # Panics
    ///
    /// Same name rules as [`ErrorCode::new`].
    #[inline]
    pub const fn derived(name: &'static str, value: i64) -> Self {
        Self::new(name, value, http_from_value(value))
    }

    /// Runtime construction from an owned name (explicit HTTP status).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCodeViolation`] if the name breaks the naming rules.
    pub fn checked_new(
        name: impl Into<Cow<'static, str>>,
        value: i64,
        http_error: u16,
    ) -> Result<Self, ErrorCodeViolation> {
        let name = name.into();
        if name.is_empty() {
            return Err(ErrorCodeViolation::EmptyName);
        }
        if !is_valid_name(&name) {
            return Err(ErrorCodeViolation::InvalidName {
                name: name.into_owned(),
            });
        }

        Ok(Self {
            name,
            value,
            http_error,
        })
    }

    /// Build a code from already-split wire parts without validation.
    ///
    /// The HTTP status is always recomputed from `value`.
    #[inline]
    pub(crate) fn from_wire_parts(name: String, value: i64) -> Self {
        Self {
            name: Cow::Owned(name),
            value,
            http_error: http_from_value(value),
        }
    }

    /// Symbolic name, e.g. `"NotFoundError"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric value, e.g. `40404`.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// HTTP status to use as the transport status code.
    #[inline]
    pub const fn http_error(&self) -> u16 {
        self.http_error
    }

    /// Whether `http_error` agrees with the derived `value mod 1000` policy.
    ///
    /// Codes for which this is `false` lose their explicit status on a JSON
    /// round-trip.
    #[inline]
    pub const fn is_http_derived(&self) -> bool {
        self.http_error == http_from_value(self.value)
    }

    /// Split a wire string into name and value.
    ///
    /// The split happens at the first `-`; the remainder must parse as `i64`,
    /// which lets negative values round-trip (`"Offset--5"`).
    pub(crate) fn split_wire(raw: &str) -> Result<(&str, i64), ErrorCodeViolation> {
        let Some((name, value)) = raw.split_once(CODE_SEPARATOR) else {
            return Err(ErrorCodeViolation::MalformedWireCode {
                raw: raw.to_owned(),
            });
        };

        let value = value
            .parse::<i64>()
            .map_err(|_| ErrorCodeViolation::InvalidValue {
                raw: raw.to_owned(),
            })?;

        Ok((name, value))
    }
}

impl PartialEq for ErrorCode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.name == other.name
    }
}

impl Eq for ErrorCode {}

impl Hash for ErrorCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for ErrorCode {
    /// Wire form: `<name>-<value>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, CODE_SEPARATOR, self.value)
    }
}

impl FromStr for ErrorCode {
    type Err = ErrorCodeViolation;

    /// Strict parse of the wire form. The HTTP status is derived from the
    /// value.
    ///
    /// The name must satisfy the same rules as [`ErrorCode::checked_new`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, value) = Self::split_wire(raw)?;
        if name.is_empty() {
            return Err(ErrorCodeViolation::EmptyName);
        }
        if !is_valid_name(name) {
            return Err(ErrorCodeViolation::InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(Self::from_wire_parts(name.to_owned(), value))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn explicit_constructor_keeps_http_status() {
        const CODE: ErrorCode = ErrorCode::new("CustomError", 123, 400);
        assert_eq!(CODE.name(), "CustomError");
        assert_eq!(CODE.value(), 123);
        assert_eq!(CODE.http_error(), 400);
        assert!(!CODE.is_http_derived());
    }

    #[test]
    fn derived_constructor_uses_low_three_digits() {
        assert_eq!(ErrorCode::derived("A", 40404).http_error(), 404);
        assert_eq!(ErrorCode::derived("A", 10001).http_error(), 1);
        assert_eq!(ErrorCode::derived("A", 0).http_error(), 0);
        assert_eq!(ErrorCode::derived("A", 999).http_error(), 999);
        assert_eq!(ErrorCode::derived("A", 1000).http_error(), 0);
    }

    #[test]
    fn derived_constructor_normalizes_negative_values() {
        assert_eq!(http_from_value(-5), 995);
        assert_eq!(http_from_value(-1000), 0);
        assert_eq!(http_from_value(-1001), 999);
        assert_eq!(ErrorCode::derived("Neg", -40404).http_error(), 596);
    }

    #[test]
    fn display_is_name_dash_value() {
        assert_eq!(ErrorCode::new("TEST", 1, 1).to_string(), "TEST-1");
        assert_eq!(ErrorCode::derived("Offset", -5).to_string(), "Offset--5");
    }

    #[test]
    fn identity_ignores_http_status() {
        let a = ErrorCode::new("Same", 10, 400);
        let b = ErrorCode::new("Same", 10, 500);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        assert_ne!(ErrorCode::new("Same", 10, 400), ErrorCode::new("Same", 11, 400));
        assert_ne!(ErrorCode::new("Same", 10, 400), ErrorCode::new("Other", 10, 400));
    }

    #[test]
    fn checked_new_rejects_bad_names() {
        assert_eq!(
            ErrorCode::checked_new("", 1, 500),
            Err(ErrorCodeViolation::EmptyName)
        );
        assert!(matches!(
            ErrorCode::checked_new("has-dash", 1, 500),
            Err(ErrorCodeViolation::InvalidName { .. })
        ));
        assert!(matches!(
            ErrorCode::checked_new("has space", 1, 500),
            Err(ErrorCodeViolation::InvalidName { .. })
        ));

        let code = ErrorCode::checked_new(String::from("Dynamic"), 42, 418).unwrap();
        assert_eq!(code.http_error(), 418);
    }

    #[test]
    fn strict_parse_round_trips_display() {
        let code: ErrorCode = "NotFoundError-40404".parse().unwrap();
        assert_eq!(code.name(), "NotFoundError");
        assert_eq!(code.value(), 40404);
        assert_eq!(code.http_error(), 404);

        let negative: ErrorCode = "Offset--5".parse().unwrap();
        assert_eq!(negative.value(), -5);
        assert_eq!(negative.http_error(), 995);
    }

    #[test]
    fn strict_parse_rejects_malformed_input() {
        assert!(matches!(
            "NoSeparator".parse::<ErrorCode>(),
            Err(ErrorCodeViolation::MalformedWireCode { .. })
        ));
        assert!(matches!(
            "A-B-3".parse::<ErrorCode>(),
            Err(ErrorCodeViolation::InvalidValue { .. })
        ));
        assert!(matches!(
            "Name-abc".parse::<ErrorCode>(),
            Err(ErrorCodeViolation::InvalidValue { .. })
        ));
    }

    #[test]
    fn strict_parse_applies_name_rules() {
        assert_eq!("-5".parse::<ErrorCode>(), Err(ErrorCodeViolation::EmptyName));
        assert_eq!(
            "a b-1".parse::<ErrorCode>(),
            Err(ErrorCodeViolation::InvalidName {
                name: "a b".to_owned()
            })
        );
        assert!(matches!(
            "\tTab-1".parse::<ErrorCode>(),
            Err(ErrorCodeViolation::InvalidName { .. })
        ));

        // Anything the strict parser accepts, checked_new accepts too.
        let parsed: ErrorCode = "Fine-7".parse().unwrap();
        assert!(ErrorCode::checked_new(parsed.name().to_owned(), 7, 7).is_ok());
    }

    #[test]
    fn violation_messages_bound_echoed_input() {
        let raw = format!("Name-{}", "9x".repeat(50_000));
        let violation = ErrorCodeViolation::InvalidValue { raw };
        let rendered = violation.to_string();

        assert!(rendered.len() < 2 * crate::logging::MAX_FIELD_OUTPUT_LEN);
        assert!(rendered.contains("[TRUNCATED]"));

        let name = ErrorCodeViolation::InvalidName {
            name: " ".repeat(10_000),
        };
        assert!(name.to_string().len() < 2 * crate::logging::MAX_FIELD_OUTPUT_LEN);
    }

    #[test]
    fn violation_messages_name_the_input() {
        let violation = ErrorCodeViolation::MalformedWireCode {
            raw: "garbage".to_owned(),
        };
        assert!(violation.to_string().contains("garbage"));
    }
}
