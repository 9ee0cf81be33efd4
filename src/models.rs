//! The error value model: [`Error`], its nested [`Cause`]s, [`FieldError`]
//! records and the debug-only [`StackTrace`].
//!
//! # Shape
//!
//! ```text
//! Error
//! ├── code: ErrorCode                (exactly one)
//! ├── message: String
//! ├── trace: Option<StackTrace>      (captured only in debug mode)
//! ├── nested: [Cause]                (ordered causal chain, may be empty)
//! └── field_errors: [FieldError]     (validation detail, may be empty)
//! ```
//!
//! A [`Cause`] is either another structured [`Error`] or an [`OpaqueError`]
//! holding only the display text of some foreign error. The split is explicit
//! so that the JSON decoder can represent "this nested entry was a plain
//! string" without guessing.
//!
//! # Build Phase
//!
//! An `Error` is a builder while it is being assembled. The consuming
//! `with_*` methods and the in-place `add_*`/`set_*` methods both mutate the
//! same value; nothing is copied. Once handed off, treat it as frozen: an
//! `Error` is `Send + Sync` but has no interior synchronization, so sharing
//! a half-built value across threads needs external locking.
//!
//! # Display
//!
//! `"<Name>-<Value>: <Message>"`, or the message alone when the code is a
//! no-op sentinel ([`UNKNOWN`](crate::definitions::UNKNOWN) or
//! [`GENERIC`](crate::definitions::GENERIC)). Each nested entry is appended
//! as `"; <nested display>"`.

use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

use smallvec::SmallVec;

use crate::codes::{ErrorCode, ErrorCodeViolation};
use crate::debug;
use crate::definitions;

/// Inline capacity for nested causes. Most errors wrap at most one or two.
pub(crate) const INLINE_CAUSES: usize = 2;

pub(crate) type Causes = SmallVec<[Cause; INLINE_CAUSES]>;

// ============================================================================
// Field Errors
// ============================================================================

/// One validation failure on one input field.
///
/// This is a carrier for the result of validation, not a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field, e.g. `"email"`.
    pub field: String,
    /// Rule that failed, e.g. `"required"`.
    pub rule: String,
    /// Rule parameter, e.g. `"8"` for `min=8`. Empty when the rule has none.
    pub param: String,
    /// Human readable explanation.
    pub message: String,
}

impl FieldError {
    #[inline]
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            write!(f, "{} ({}): {}", self.field, self.rule, self.message)
        } else {
            write!(
                f,
                "{} ({}={}): {}",
                self.field, self.rule, self.param, self.message
            )
        }
    }
}

// ============================================================================
// Stack Trace
// ============================================================================

/// Debug-only capture of where an error was built.
///
/// Present on an [`Error`] only if debug mode was active when it was
/// constructed. Its absence is meaningful: there is no empty placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    /// Rendered backtrace of the constructing thread, as raw bytes.
    ///
    /// Travels as a base64 string on the wire.
    pub trace: Vec<u8>,
    /// `file:line:column` of the direct caller of the public constructor.
    pub caller: String,
}

impl StackTrace {
    /// Capture a trace pointing at `location`.
    pub(crate) fn capture(location: &Location<'_>) -> Self {
        Self {
            trace: debug::capture_stack_trace(),
            caller: debug::capture_caller(location),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trace.is_empty() && self.caller.is_empty()
    }
}

// ============================================================================
// Opaque Causes
// ============================================================================

/// A nested cause known only by its display text.
///
/// Produced when a foreign error is wrapped, or when a nested wire entry was
/// a plain JSON string. Its code is always [`GENERIC`](definitions::GENERIC).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueError {
    message: String,
}

impl OpaqueError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Promote to a structured error carrying the generic code.
    pub fn into_error(self) -> Error {
        Error::from_parts(
            definitions::GENERIC,
            self.message,
            None,
            Causes::new(),
            Vec::new(),
        )
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for OpaqueError {}

// ============================================================================
// Causes
// ============================================================================

/// One entry of an error's causal chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    /// Another structured error. Boxed to keep the recursion sized.
    Structured(Box<Error>),
    /// A foreign error reduced to its message.
    Opaque(OpaqueError),
}

impl Cause {
    /// Convert an arbitrary error.
    ///
    /// The error and its `source()` chain are searched with
    /// [`as_error_dyn`](crate::as_error_dyn), so a structured error boxed
    /// in an `io::Error` stays structured. A wrapper that only forwards
    /// the inner error's text collapses to that error; a wrapper with its
    /// own text becomes an error with the inner code, the wrapper's text
    /// and the inner error nested. Anything else is reduced to its display
    /// text.
    pub fn from_dyn(err: &(dyn StdError + 'static)) -> Self {
        let Some(found) = crate::inspect::as_error_dyn(err) else {
            return Self::Opaque(OpaqueError::new(err.to_string()));
        };

        let outer = err.to_string();
        if outer == found.to_string() {
            return Self::Structured(Box::new(found.clone()));
        }

        let mut nested = Causes::new();
        nested.push(Self::Structured(Box::new(found.clone())));
        Self::Structured(Box::new(Error::from_parts(
            found.code().clone(),
            outer,
            None,
            nested,
            Vec::new(),
        )))
    }

    /// Wrap any foreign error by its display text.
    #[inline]
    pub fn foreign<E: StdError + ?Sized>(err: &E) -> Self {
        Self::Opaque(OpaqueError::new(err.to_string()))
    }

    /// The structured error, if this cause is one.
    #[inline]
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Self::Structured(err) => Some(err),
            Self::Opaque(_) => None,
        }
    }

    /// The code of this cause. Opaque causes report [`GENERIC`](definitions::GENERIC).
    #[inline]
    pub fn code(&self) -> &ErrorCode {
        match self {
            Self::Structured(err) => err.code(),
            Self::Opaque(_) => &definitions::GENERIC_REF,
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Turn into a structured error. Opaque causes become generic errors.
    pub fn into_error(self) -> Error {
        match self {
            Self::Structured(err) => *err,
            Self::Opaque(opaque) => opaque.into_error(),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(err) => fmt::Display::fmt(err, f),
            Self::Opaque(opaque) => fmt::Display::fmt(opaque, f),
        }
    }
}

impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Structured(err) => err.source(),
            Self::Opaque(_) => None,
        }
    }
}

impl From<Error> for Cause {
    #[inline]
    fn from(err: Error) -> Self {
        Self::Structured(Box::new(err))
    }
}

impl From<Box<Error>> for Cause {
    #[inline]
    fn from(err: Box<Error>) -> Self {
        Self::Structured(err)
    }
}

impl From<OpaqueError> for Cause {
    #[inline]
    fn from(err: OpaqueError) -> Self {
        Self::Opaque(err)
    }
}

impl From<String> for Cause {
    #[inline]
    fn from(message: String) -> Self {
        Self::Opaque(OpaqueError::new(message))
    }
}

impl From<&str> for Cause {
    #[inline]
    fn from(message: &str) -> Self {
        Self::Opaque(OpaqueError::new(message))
    }
}

impl From<std::io::Error> for Cause {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::from_dyn(&err)
    }
}

impl From<serde_json::Error> for Cause {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::foreign(&err)
    }
}

impl From<ErrorCodeViolation> for Cause {
    #[inline]
    fn from(err: ErrorCodeViolation) -> Self {
        Self::foreign(&err)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for Cause {
    #[inline]
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        Self::from_dyn(err.as_ref())
    }
}

// ============================================================================
// Optional Causes
// ============================================================================

/// Conversion into an optional cause.
///
/// Every API that accepts causes accepts `T` and `Option<T>` for each
/// supported `T`; `None` entries are skipped.
pub trait IntoCause {
    fn into_cause(self) -> Option<Cause>;
}

macro_rules! impl_into_cause {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoCause for $ty {
                #[inline]
                fn into_cause(self) -> Option<Cause> {
                    Some(Cause::from(self))
                }
            }

            impl IntoCause for Option<$ty> {
                #[inline]
                fn into_cause(self) -> Option<Cause> {
                    self.map(Cause::from)
                }
            }
        )+
    };
}

impl IntoCause for Cause {
    #[inline]
    fn into_cause(self) -> Option<Cause> {
        Some(self)
    }
}

impl IntoCause for Option<Cause> {
    #[inline]
    fn into_cause(self) -> Option<Cause> {
        self
    }
}

impl_into_cause!(
    Error,
    Box<Error>,
    OpaqueError,
    String,
    &str,
    std::io::Error,
    serde_json::Error,
    ErrorCodeViolation,
    Box<dyn StdError + Send + Sync>,
);

// ============================================================================
// Error
// ============================================================================

/// A structured, code-carrying error.
///
/// Build one with [`Error::new`], [`Error::wrap`], [`Error::validation`] or
/// the [`error!`](crate::error) macro family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace: Option<StackTrace>,
    nested: Causes,
    field_errors: Vec<FieldError>,
}

impl Error {
    /// Assemble an error from already-resolved parts. No trace is captured.
    #[inline]
    pub(crate) fn from_parts(
        code: ErrorCode,
        message: String,
        trace: Option<StackTrace>,
        nested: Causes,
        field_errors: Vec<FieldError>,
    ) -> Self {
        Self {
            code,
            message,
            trace,
            nested,
            field_errors,
        }
    }

    #[inline]
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Debug capture, present only if debug mode was on at construction.
    #[inline]
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        self.trace.as_ref()
    }

    /// The causal chain, in insertion order.
    #[inline]
    pub fn nested_errors(&self) -> &[Cause] {
        &self.nested
    }

    #[inline]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// HTTP status to send with this error. Always `code().http_error()`.
    #[inline]
    pub fn http_status(&self) -> u16 {
        self.code.http_error()
    }

    /// The single-cause view of the chain: the first nested entry only.
    #[inline]
    pub fn first_nested(&self) -> Option<&Cause> {
        self.nested.first()
    }

    /// Whether the code is [`JOINED`](definitions::JOINED).
    #[inline]
    pub fn is_joined(&self) -> bool {
        self.code == definitions::JOINED
    }

    // ------------------------------------------------------------------------
    // Builder-style mutation
    // ------------------------------------------------------------------------

    /// Append causes, skipping `None`. Never deduplicates.
    #[must_use]
    pub fn with_nested_error<I>(mut self, causes: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoCause,
    {
        self.add_nested_error(causes);
        self
    }

    /// In-place form of [`with_nested_error`](Self::with_nested_error).
    pub fn add_nested_error<I>(&mut self, causes: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoCause,
    {
        self.nested
            .extend(causes.into_iter().filter_map(IntoCause::into_cause));
        self
    }

    /// Replace the code unconditionally.
    #[must_use]
    pub fn with_error_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// In-place form of [`with_error_code`](Self::with_error_code).
    pub fn set_error_code(&mut self, code: ErrorCode) -> &mut Self {
        self.code = code;
        self
    }

    /// Append field errors.
    #[must_use]
    pub fn with_field_errors(mut self, fields: impl IntoIterator<Item = FieldError>) -> Self {
        self.field_errors.extend(fields);
        self
    }

    /// Drop the captured trace, if any.
    #[must_use]
    pub fn without_stack_trace(mut self) -> Self {
        self.trace = None;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if definitions::is_noop(&self.code) {
            f.write_str(&self.message)?;
        } else {
            write!(f, "{}: {}", self.code, self.message)?;
        }

        for cause in &self.nested {
            write!(f, "; {}", cause)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.nested
            .first()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{GENERIC, NOT_FOUND, UNKNOWN};

    fn plain(code: ErrorCode, message: &str) -> Error {
        Error::from_parts(code, message.to_owned(), None, Causes::new(), Vec::new())
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<Cause>();
    }

    #[test]
    fn display_prefixes_code_unless_noop() {
        assert_eq!(plain(NOT_FOUND, "no user").to_string(), "NotFoundError-40404: no user");
        assert_eq!(plain(UNKNOWN, "boom").to_string(), "boom");
        assert_eq!(plain(GENERIC, "boom").to_string(), "boom");
    }

    #[test]
    fn display_appends_nested_entries() {
        let err = plain(NOT_FOUND, "outer")
            .with_nested_error([Cause::from(plain(UNKNOWN, "inner")), Cause::from("plain")]);
        assert_eq!(err.to_string(), "NotFoundError-40404: outer; inner; plain");
    }

    #[test]
    fn nested_none_is_noop() {
        let mut err = plain(UNKNOWN, "x");
        err.add_nested_error([None::<Error>]);
        err.add_nested_error(Vec::<Cause>::new());
        assert!(err.nested_errors().is_empty());
    }

    #[test]
    fn nested_entries_accumulate_without_dedup() {
        let e1 = plain(UNKNOWN, "e1");
        let e2 = plain(UNKNOWN, "e2");

        let mut err = plain(UNKNOWN, "x");
        err.add_nested_error([e1.clone(), e2.clone()]);
        err.add_nested_error([e1, e2]);
        assert_eq!(err.nested_errors().len(), 4);
    }

    #[test]
    fn in_place_mutation_returns_same_value() {
        let mut err = plain(UNKNOWN, "x");
        err.set_error_code(NOT_FOUND).add_nested_error(["cause"]);
        assert_eq!(err.code(), &NOT_FOUND);
        assert_eq!(err.nested_errors().len(), 1);
    }

    #[test]
    fn first_nested_is_single_cause_view() {
        let err = plain(UNKNOWN, "x").with_nested_error(["first", "second"]);
        assert_eq!(err.first_nested().map(ToString::to_string).as_deref(), Some("first"));
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("first"));
    }

    #[test]
    fn source_chain_walks_structured_causes() {
        let root = plain(UNKNOWN, "root");
        let middle = plain(NOT_FOUND, "middle").with_nested_error([root]);
        let top = plain(UNKNOWN, "top").with_nested_error([middle]);

        let mut chain = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = top.source();
        while let Some(err) = current {
            chain.push(err.to_string());
            current = err.source();
        }
        assert_eq!(chain, vec!["NotFoundError-40404: middle; root", "root"]);
    }

    #[test]
    fn http_status_follows_code() {
        let err = plain(NOT_FOUND, "x");
        assert_eq!(err.http_status(), err.code().http_error());
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn opaque_cause_reports_generic_code() {
        let cause = Cause::from("disk on fire");
        assert!(cause.is_opaque());
        assert_eq!(cause.code(), &GENERIC);
        assert_eq!(cause.into_error().code(), &GENERIC);
    }

    #[test]
    fn from_dyn_keeps_structured_errors() {
        let err = plain(NOT_FOUND, "x");
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(err.clone());
        assert_eq!(Cause::from(boxed).as_error(), Some(&err));

        let io = std::io::Error::other("io broke");
        assert!(Cause::from(io).is_opaque());
    }

    #[test]
    fn from_dyn_looks_through_io_error() {
        let inner = plain(NOT_FOUND, "row 9");
        let io = std::io::Error::other(inner.clone());

        let cause = Cause::from(io);
        assert_eq!(cause.as_error(), Some(&inner));
        assert_eq!(cause.code(), &NOT_FOUND);
    }

    #[derive(Debug)]
    struct Context {
        inner: Error,
    }

    impl fmt::Display for Context {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("loading profile")
        }
    }

    impl StdError for Context {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn from_dyn_keeps_wrapper_text_over_structured_source() {
        let inner = plain(NOT_FOUND, "row 9");
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(Context {
            inner: inner.clone(),
        });

        let cause = Cause::from(boxed);
        let structured = cause.as_error().expect("structured");
        assert_eq!(structured.code(), &NOT_FOUND);
        assert_eq!(structured.message(), "loading profile");
        assert_eq!(structured.nested_errors(), &[Cause::from(inner)]);
    }

    #[test]
    fn field_error_display() {
        assert_eq!(
            FieldError::new("password", "min", "8", "too short").to_string(),
            "password (min=8): too short"
        );
        assert_eq!(
            FieldError::new("email", "required", "", "missing").to_string(),
            "email (required): missing"
        );
    }
}
