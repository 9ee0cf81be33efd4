//! # Coded Errors
//!
//! Structured errors that carry a symbolic code, an HTTP status, a causal
//! chain, field-level validation detail and, in debug mode, where they were
//! built. Built so that many services can raise, classify, wrap, join and
//! serialize errors the same way across process and network boundaries.
//!
//! ## Design Philosophy
//!
//! 1. **The code is the contract.** `"UserNotFoundError-40404"` means the
//!    same thing in every service; compare codes, not messages.
//! 2. **The low three digits are the HTTP status.** A code maps to a
//!    transport status without a lookup table.
//! 3. **Wrapping keeps the deepest meaningful code.** Wrapping a structured
//!    error inherits its code; wrapping a foreign error does not.
//! 4. **Decoding degrades, it does not fail.** A peer with an out-of-date
//!    catalog still gets a usable error, and a warning is logged.
//! 5. **Debug detail is opt-in at both ends.** Traces are captured only in
//!    debug mode and only sent while debug mode is on.
//!
//! ## Quick Start
//!
//! ```rust
//! use coded_errors::{definitions, error, wrap, Result};
//!
//! fn find_user(id: u64) -> Result<String> {
//!     Err(error!("user {} does not exist", id; definitions::USER_NOT_FOUND))
//! }
//!
//! fn load_profile(id: u64) -> Result<String> {
//!     find_user(id).map_err(|err| wrap!(err, "loading profile"))
//! }
//!
//! let err = load_profile(7).unwrap_err();
//! assert_eq!(err.http_status(), 404);
//! assert!(err.has(&definitions::USER_NOT_FOUND, false).is_some());
//! assert_eq!(
//!     err.to_string(),
//!     "UserNotFoundError-40404: loading profile; UserNotFoundError-40404: user 7 does not exist"
//! );
//! ```
//!
//! ## Joining Independent Failures
//!
//! ```rust
//! use coded_errors::{definitions, error, join};
//!
//! let joined = join([
//!     error!("email taken"; definitions::DUPLICATE_ENTITY),
//!     error!("quota reached"; definitions::RATE_LIMIT_EXCEEDED),
//! ])
//! .unwrap();
//!
//! assert_eq!(joined.code(), &definitions::JOINED);
//! assert!(joined.has(&definitions::RATE_LIMIT_EXCEEDED, true).is_some());
//! assert!(joined.has(&definitions::RATE_LIMIT_EXCEEDED, false).is_none());
//! ```
//!
//! ## Crossing a Process Boundary
//!
//! ```rust
//! use coded_errors::{definitions, error, Error};
//!
//! let sent = error!("order 12 missing"; definitions::ENTITY_NOT_FOUND);
//! let body = sent.to_json().unwrap();
//!
//! let received = Error::from_json(&body).unwrap();
//! assert_eq!(received.code(), &definitions::ENTITY_NOT_FOUND);
//! assert_eq!(received.http_status(), 404);
//! ```
//!
//! ## Configuration
//!
//! Debug mode is read from the `DEBUG_MODE` environment variable unless
//! overridden through [`debug`]. No Cargo features are required.
//!
//! ## Logging
//!
//! Decoder warnings go through `tracing` under the target
//! [`logging::WIRE_TARGET`]. Install any subscriber to see them.

#![warn(clippy::all)]

use std::fmt;

pub mod codec;
pub mod codes;
pub mod context;
pub mod convenience;
pub mod debug;
pub mod definitions;
pub mod inspect;
pub mod logging;
pub mod models;

pub use codes::{http_from_value, ErrorCode, ErrorCodeViolation, CODE_SEPARATOR};
pub use context::{join, ErrorOption, IntoErrorOption};
pub use inspect::{as_error, as_error_dyn, has, has_dyn};
pub use models::{Cause, Error, FieldError, IntoCause, OpaqueError, StackTrace};

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unwrap `result` or panic with the error's display text.
///
/// An opt-in fail-fast helper for startup code and tools; the library never
/// calls it.
///
/// ```rust,should_panic
/// use coded_errors::{error, must, Result};
///
/// let config: Result<u32> = Err(error!("config missing"));
/// must(config);
/// ```
#[track_caller]
pub fn must<T, E: fmt::Display>(result: std::result::Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
