//! Inspection API: recovering a structured [`Error`] from an arbitrary error
//! and searching for a code.
//!
//! [`has`] matches the top-level code first. Only when that error is a
//! [`JOINED`](definitions::JOINED) composite and `recurse` is set does it
//! descend into the members, depth first and in member order, through any
//! number of nested joins. Plain wrap chains are not searched: wrapping
//! already propagates the inner code outward.

use std::error::Error as StdError;

use crate::codes::ErrorCode;
use crate::definitions;
use crate::models::{Cause, Error};

/// The structured error behind a cause, if any.
#[inline]
pub fn as_error(cause: &Cause) -> Option<&Error> {
    cause.as_error()
}

/// Find a structured error in `err` or its `source()` chain.
///
/// The first link that is an [`Error`] (or a structured [`Cause`]) is
/// returned. Errors boxed inside a `std::io::Error` are looked through.
pub fn as_error_dyn<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    let mut current = Some(err);
    while let Some(link) = current {
        if let Some(structured) = link.downcast_ref::<Error>() {
            return Some(structured);
        }
        if let Some(structured) = link.downcast_ref::<Cause>().and_then(Cause::as_error) {
            return Some(structured);
        }
        // io::Error::source() skips the error it wraps.
        current = match link
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
        {
            Some(inner) => Some(inner as &(dyn StdError + 'static)),
            None => link.source(),
        };
    }
    None
}

/// Find the error carrying `code`.
///
/// Matches `err` itself, then, if `err` is a joined composite and `recurse`
/// is true, each member in order. The first match wins.
pub fn has<'a>(err: &'a Error, code: &ErrorCode, recurse: bool) -> Option<&'a Error> {
    if err.code() == code {
        return Some(err);
    }

    if recurse && *err.code() == definitions::JOINED {
        return err
            .nested_errors()
            .iter()
            .filter_map(Cause::as_error)
            .find_map(|member| has(member, code, recurse));
    }

    None
}

/// [`has`] for an arbitrary error, resolved through [`as_error_dyn`].
pub fn has_dyn<'a>(
    err: &'a (dyn StdError + 'static),
    code: &ErrorCode,
    recurse: bool,
) -> Option<&'a Error> {
    as_error_dyn(err).and_then(|structured| has(structured, code, recurse))
}

impl Error {
    /// Method form of [`has`].
    #[inline]
    pub fn has(&self, code: &ErrorCode, recurse: bool) -> Option<&Error> {
        has(self, code, recurse)
    }
}

impl Cause {
    /// [`has`] on a cause. Opaque causes never match.
    #[inline]
    pub fn has(&self, code: &ErrorCode, recurse: bool) -> Option<&Error> {
        self.as_error().and_then(|err| has(err, code, recurse))
    }
}
