//! Construction API: building errors from a message plus typed options, and
//! collapsing several errors into one with [`join`].
//!
//! # Options
//!
//! Everything beyond the message is passed as an [`ErrorOption`]:
//!
//! - `Code`: sets the code (last one wins, default [`UNKNOWN`](definitions::UNKNOWN))
//! - `Field` / `Fields`: appended to the field errors
//! - `Cause`: the error being wrapped (last one wins)
//!
//! After all options are applied, in this order:
//!
//! 1. If any field errors are present and the code is still `UNKNOWN`, the
//!    code becomes [`INVALID_FORM_DATA`](definitions::INVALID_FORM_DATA).
//! 2. If the cause is a structured error, its code replaces the code. Wrapping
//!    keeps the innermost meaningful code.
//! 3. The cause, structured or opaque, becomes the first nested entry.
//!
//! `None` options are skipped, so optional values can be passed straight
//! through.
//!
//! # Traces
//!
//! Every constructor except [`Error::without_trace`],
//! [`Error::validation_failure`] and [`join`] captures a
//! [`StackTrace`](crate::StackTrace) when debug mode is active. The recorded
//! caller is the code that called the constructor (`#[track_caller]`).
//!
//! # Example
//!
//! ```rust
//! use coded_errors::{definitions, Error, ErrorOption, FieldError};
//!
//! let err = Error::with_options(
//!     "bad signup form",
//!     [ErrorOption::from(FieldError::new("email", "required", "", "missing"))],
//! );
//! assert_eq!(err.code(), &definitions::INVALID_FORM_DATA);
//!
//! let outer = Error::wrap(err, "signup failed");
//! assert_eq!(outer.code(), &definitions::INVALID_FORM_DATA);
//! assert_eq!(outer.nested_errors().len(), 1);
//! ```

use std::panic::Location;

use crate::codes::{ErrorCode, ErrorCodeViolation};
use crate::debug;
use crate::definitions;
use crate::models::{Cause, Causes, Error, FieldError, IntoCause, OpaqueError, StackTrace};

// ============================================================================
// Construction Options
// ============================================================================

/// A typed construction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOption {
    Code(ErrorCode),
    Field(FieldError),
    Fields(Vec<FieldError>),
    Cause(Cause),
}

impl From<ErrorCode> for ErrorOption {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}

impl From<&ErrorCode> for ErrorOption {
    #[inline]
    fn from(code: &ErrorCode) -> Self {
        Self::Code(code.clone())
    }
}

impl From<FieldError> for ErrorOption {
    #[inline]
    fn from(field: FieldError) -> Self {
        Self::Field(field)
    }
}

impl From<Vec<FieldError>> for ErrorOption {
    #[inline]
    fn from(fields: Vec<FieldError>) -> Self {
        Self::Fields(fields)
    }
}

impl From<Cause> for ErrorOption {
    #[inline]
    fn from(cause: Cause) -> Self {
        Self::Cause(cause)
    }
}

impl From<Error> for ErrorOption {
    #[inline]
    fn from(err: Error) -> Self {
        Self::Cause(Cause::from(err))
    }
}

/// Conversion into an optional construction option. `None` is skipped.
pub trait IntoErrorOption {
    fn into_error_option(self) -> Option<ErrorOption>;
}

impl IntoErrorOption for ErrorOption {
    #[inline]
    fn into_error_option(self) -> Option<ErrorOption> {
        Some(self)
    }
}

impl IntoErrorOption for Option<ErrorOption> {
    #[inline]
    fn into_error_option(self) -> Option<ErrorOption> {
        self
    }
}

macro_rules! impl_into_error_option {
    ($($ty:ty => $convert:expr),+ $(,)?) => {
        $(
            impl IntoErrorOption for $ty {
                #[inline]
                fn into_error_option(self) -> Option<ErrorOption> {
                    Some($convert(self))
                }
            }

            impl IntoErrorOption for Option<$ty> {
                #[inline]
                fn into_error_option(self) -> Option<ErrorOption> {
                    self.map($convert)
                }
            }
        )+
    };
}

impl_into_error_option!(
    ErrorCode => ErrorOption::Code,
    &ErrorCode => |code: &ErrorCode| ErrorOption::Code(code.clone()),
    FieldError => ErrorOption::Field,
    Vec<FieldError> => ErrorOption::Fields,
    Cause => ErrorOption::Cause,
    Error => |err: Error| ErrorOption::Cause(Cause::from(err)),
    Box<Error> => |err: Box<Error>| ErrorOption::Cause(Cause::from(err)),
    OpaqueError => |err: OpaqueError| ErrorOption::Cause(Cause::from(err)),
    std::io::Error => |err: std::io::Error| ErrorOption::Cause(Cause::from(err)),
    serde_json::Error => |err: serde_json::Error| ErrorOption::Cause(Cause::from(err)),
    ErrorCodeViolation => |err: ErrorCodeViolation| ErrorOption::Cause(Cause::from(err)),
);

// ============================================================================
// Resolution
// ============================================================================

/// Capture a trace for `location` if debug mode is on.
#[inline]
fn trace_for(location: &Location<'_>) -> Option<StackTrace> {
    if debug::is_debug_active() {
        Some(StackTrace::capture(location))
    } else {
        None
    }
}

fn resolve<I>(message: String, options: I, location: &Location<'_>) -> Error
where
    I: IntoIterator,
    I::Item: IntoErrorOption,
{
    let mut code = definitions::UNKNOWN;
    let mut fields = Vec::new();
    let mut cause = None;

    for option in options
        .into_iter()
        .filter_map(IntoErrorOption::into_error_option)
    {
        match option {
            ErrorOption::Code(explicit) => code = explicit,
            ErrorOption::Field(field) => fields.push(field),
            ErrorOption::Fields(more) => fields.extend(more),
            ErrorOption::Cause(wrapped) => cause = Some(wrapped),
        }
    }

    let trace = trace_for(location);

    if !fields.is_empty() && code == definitions::UNKNOWN {
        code = definitions::INVALID_FORM_DATA;
    }

    let mut nested = Causes::new();
    if let Some(cause) = cause {
        if let Some(structured) = cause.as_error() {
            code = structured.code().clone();
        }
        nested.push(cause);
    }

    Error::from_parts(code, message, trace, nested, fields)
}

// ============================================================================
// Constructors
// ============================================================================

impl Error {
    /// A new error with code [`UNKNOWN`](definitions::UNKNOWN).
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        resolve(message.into(), None::<ErrorOption>, Location::caller())
    }

    /// A new error configured by `options`. See the module docs for how
    /// options combine.
    #[track_caller]
    pub fn with_options<I>(message: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoErrorOption,
    {
        resolve(message.into(), options, Location::caller())
    }

    /// Wrap `cause` under a new message.
    ///
    /// A structured cause passes its code on; an opaque one leaves the code
    /// at `UNKNOWN`. With `None` this behaves like [`Error::new`].
    #[track_caller]
    pub fn wrap(cause: impl IntoCause, message: impl Into<String>) -> Self {
        resolve(
            message.into(),
            cause.into_cause().map(ErrorOption::Cause),
            Location::caller(),
        )
    }

    /// [`Error::wrap`] with extra options. `cause` is applied after
    /// `options`, so it wins over any cause among them.
    #[track_caller]
    pub fn wrap_with<I>(cause: impl IntoCause, message: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoErrorOption,
    {
        let options = options
            .into_iter()
            .filter_map(IntoErrorOption::into_error_option)
            .chain(cause.into_cause().map(ErrorOption::Cause));
        resolve(message.into(), options, Location::caller())
    }

    /// A validation error carrying `fields`, with code
    /// [`INVALID_FORM_DATA`](definitions::INVALID_FORM_DATA).
    #[track_caller]
    pub fn validation(
        message: impl Into<String>,
        fields: impl IntoIterator<Item = FieldError>,
    ) -> Self {
        Self::from_parts(
            definitions::INVALID_FORM_DATA,
            message.into(),
            trace_for(Location::caller()),
            Causes::new(),
            fields.into_iter().collect(),
        )
    }

    /// A validation error for a single field rule, with the fixed message
    /// `"Invalid form sent."`. Never carries a trace.
    pub fn validation_failure(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            definitions::INVALID_FORM_DATA,
            String::from("Invalid form sent."),
            None,
            Causes::new(),
            vec![FieldError::new(field, rule, "", message)],
        )
    }

    /// An `UNKNOWN` error that never captures a trace, even in debug mode.
    pub fn without_trace(message: impl Into<String>) -> Self {
        Self::from_parts(
            definitions::UNKNOWN,
            message.into(),
            None,
            Causes::new(),
            Vec::new(),
        )
    }
}

// ============================================================================
// Join
// ============================================================================

/// Collapse several errors into one.
///
/// `None` entries are removed first. Then:
///
/// - nothing left: `None`
/// - one left: that entry, unchanged
/// - two or more: a [`JOINED`](definitions::JOINED) error whose message is
///   `"[<e1>; <e2>; ...]"` and whose nested entries are the members in order
///
/// ```rust
/// use coded_errors::{join, Error};
///
/// assert!(join(Vec::<Error>::new()).is_none());
///
/// let joined = join([Error::new("a"), Error::new("b")]).unwrap();
/// assert_eq!(joined.to_string(), "JoinedError-50300: [a; b]; a; b");
/// ```
pub fn join<I>(causes: I) -> Option<Cause>
where
    I: IntoIterator,
    I::Item: IntoCause,
{
    let mut members: Causes = causes
        .into_iter()
        .filter_map(IntoCause::into_cause)
        .collect();

    match members.len() {
        0 => None,
        1 => members.pop(),
        _ => {
            let rendered: Vec<String> = members.iter().map(ToString::to_string).collect();
            let message = format!("[{}]", rendered.join("; "));
            Some(Cause::from(Error::from_parts(
                definitions::JOINED,
                message,
                None,
                members,
                Vec::new(),
            )))
        }
    }
}
