//! Convenience macros for creating errors with format strings, and for
//! declaring error codes.
//!
//! # Error Macros
//!
//! The message is always a format string literal followed by its arguments.
//! Construction options, if any, come after a `;`:
//!
//! ```rust
//! use coded_errors::{definitions, error, wrap, FieldError};
//!
//! let id = 7;
//! let missing = error!("user {} not found", id; definitions::USER_NOT_FOUND);
//! assert_eq!(missing.to_string(), "UserNotFoundError-40404: user 7 not found");
//!
//! let outer = wrap!(missing, "loading profile {id}");
//! assert_eq!(outer.code(), &definitions::USER_NOT_FOUND);
//!
//! let form = error!("bad form"; FieldError::new("email", "required", "", "missing"));
//! assert_eq!(form.code(), &definitions::INVALID_FORM_DATA);
//! ```
//!
//! Options go through [`IntoErrorOption`](crate::IntoErrorOption), so codes,
//! field errors, causes and `Option`s of any of them can be mixed freely;
//! `None` is skipped.
//!
//! # Code Macros
//!
//! [`define_error_code!`] and [`define_error_codes!`] declare `const` codes.
//! Names are checked at compile time.
//!
//! ```rust
//! use coded_errors::define_error_codes;
//!
//! define_error_codes! {
//!     /// Billing codes.
//!     BILLING_ERRORS, 80_000 => {
//!         CARD_DECLINED = ("CardDeclinedError", 402),
//!         INVOICE_LOCKED = ("InvoiceLockedError", 423),
//!     }
//! }
//!
//! assert_eq!(CARD_DECLINED.to_string(), "CardDeclinedError-80402");
//! assert_eq!(BILLING_ERRORS.len(), 2);
//! ```
//!
//! ```rust,compile_fail
//! use coded_errors::define_error_code;
//!
//! // Names must not contain the wire separator.
//! define_error_code!(BROKEN = ("Broken-Name", 40400, 404));
//! # fn main() { let _ = BROKEN; }
//! ```

// ============================================================================
// Error Creation Macros
// ============================================================================

/// Create an [`Error`](crate::Error) from a format string, with optional
/// construction options after `;`.
///
/// Captures a stack trace when debug mode is active; the recorded caller is
/// the macro call site.
#[macro_export]
macro_rules! error {
    ($fmt:literal $(, $arg:expr)* ; $($opt:expr),+ $(,)?) => {
        $crate::Error::with_options(
            ::std::format!($fmt $(, $arg)*),
            [$($crate::IntoErrorOption::into_error_option($opt)),+],
        )
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::Error::new(::std::format!($fmt $(, $arg)*))
    };
}

/// Wrap a cause under a formatted message. See [`Error::wrap`](crate::Error::wrap).
#[macro_export]
macro_rules! wrap {
    ($cause:expr, $fmt:literal $(, $arg:expr)* ; $($opt:expr),+ $(,)?) => {
        $crate::Error::wrap_with(
            $cause,
            ::std::format!($fmt $(, $arg)*),
            [$($crate::IntoErrorOption::into_error_option($opt)),+],
        )
    };
    ($cause:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::Error::wrap($cause, ::std::format!($fmt $(, $arg)*))
    };
}

/// Create a validation error from a formatted message and field errors.
///
/// ```rust
/// use coded_errors::{validation_error, FieldError};
///
/// let err = validation_error!(
///     "{} invalid fields", 1;
///     FieldError::new("age", "min", "18", "too young"),
/// );
/// assert_eq!(err.http_status(), 422);
/// ```
#[macro_export]
macro_rules! validation_error {
    ($fmt:literal $(, $arg:expr)* ; $($field:expr),+ $(,)?) => {
        $crate::Error::validation(::std::format!($fmt $(, $arg)*), [$($field),+])
    };
}

// ============================================================================
// Error Code Macros
// ============================================================================

/// Define a single error code with an explicit HTTP status.
///
/// # Example
///
/// ```rust
/// # use coded_errors::define_error_code;
/// define_error_code!(
///     /// Order lookup failed.
///     ORDER_NOT_FOUND = ("OrderNotFoundError", 40404, 404)
/// );
/// assert_eq!(ORDER_NOT_FOUND.http_error(), 404);
/// ```
#[macro_export]
macro_rules! define_error_code {
    ($(#[$meta:meta])* $ident:ident = ($name:literal, $value:expr, $http:expr) $(,)?) => {
        $(#[$meta])*
        pub const $ident: $crate::ErrorCode = $crate::ErrorCode::new($name, $value, $http);
    };
}

/// Define a group of codes sharing a range base, plus a slice listing them.
///
/// Each entry's value is `base + http_status`.
#[macro_export]
macro_rules! define_error_codes {
    (
        $(#[$group_meta:meta])*
        $group:ident, $base:expr => {
            $( $(#[$meta:meta])* $ident:ident = ($name:literal, $http:expr) ),+ $(,)?
        }
    ) => {
        $(
            $crate::define_error_code!(
                $(#[$meta])* $ident = ($name, ($base) + ($http) as i64, $http)
            );
        )+

        $(#[$group_meta])*
        pub const $group: &[$crate::ErrorCode] = &[$($ident),+];
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::definitions::{self, CONFLICT, NOT_FOUND};
    use crate::{Cause, Error, FieldError};

    define_error_codes! {
        TEST_ERRORS, 30_000 => {
            /// Documented entry.
            TEST_NOT_FOUND = ("TestNotFoundError", definitions::http::NOT_FOUND),
            TEST_THROTTLED = ("TestThrottledError", 429),
        }
    }

    #[test]
    fn generated_codes_follow_base_plus_status() {
        assert_eq!(TEST_NOT_FOUND.value(), 30_404);
        assert_eq!(TEST_NOT_FOUND.http_error(), 404);
        assert_eq!(TEST_THROTTLED.to_string(), "TestThrottledError-30429");
        assert_eq!(TEST_ERRORS, &[TEST_NOT_FOUND, TEST_THROTTLED]);
    }

    #[test]
    fn error_macro_formats_message() {
        let name = "bob";
        let attempt = 3;
        let err = error!("user {} missing, attempt {attempt}", name);
        assert_eq!(err.message(), "user bob missing, attempt 3");
        assert_eq!(err.code(), &definitions::UNKNOWN);
    }

    #[test]
    fn error_macro_accepts_options() {
        let err = error!("conflict on {}", "row"; CONFLICT);
        assert_eq!(err.code(), &CONFLICT);

        let maybe_code: Option<crate::ErrorCode> = None;
        let err = error!("no options applied"; maybe_code);
        assert_eq!(err.code(), &definitions::UNKNOWN);
    }

    #[test]
    fn error_macro_mixes_option_kinds() {
        let cause = Error::with_options("inner", [NOT_FOUND]);
        let err = error!(
            "outer";
            CONFLICT,
            FieldError::new("id", "required", "", "missing"),
            cause,
        );
        // The structured cause's code wins.
        assert_eq!(err.code(), &NOT_FOUND);
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.nested_errors().len(), 1);
    }

    #[test]
    fn wrap_macro_inherits_code() {
        let inner = error!("missing"; NOT_FOUND);
        let err = wrap!(inner, "while loading {}", 42);
        assert_eq!(err.to_string(), "NotFoundError-40404: while loading 42; NotFoundError-40404: missing");
    }

    #[test]
    fn wrap_macro_with_options() {
        let err = wrap!(Cause::from("plain"), "outer"; CONFLICT);
        assert_eq!(err.code(), &CONFLICT);
        assert_eq!(err.to_string(), "ConflictError-40409: outer; plain");
    }

    #[test]
    fn validation_macro_collects_fields() {
        let err = validation_error!(
            "{} fields",
            2;
            FieldError::new("a", "required", "", "missing"),
            FieldError::new("b", "max", "10", "too long"),
        );
        assert_eq!(err.message(), "2 fields");
        assert_eq!(err.code(), &definitions::INVALID_FORM_DATA);
        assert_eq!(err.field_errors().len(), 2);
    }
}
