//! Process-wide debug mode and the capture helpers it gates.
//!
//! Debug mode decides two things:
//!
//! - whether constructors capture a [`StackTrace`](crate::StackTrace)
//! - whether the JSON encoder emits `stack_trace`
//!
//! Both read the flag at call time, so an error built in debug mode and
//! encoded after debug mode was switched off is sent without its trace.
//!
//! # Resolution
//!
//! 1. A programmatic override set by [`set_debug_mode`] or [`scoped`].
//! 2. Otherwise the `DEBUG_MODE` environment variable, read on every call.
//!    `1`, `true`, `yes` and `on` (any case, surrounding whitespace ignored)
//!    enable it; anything else, or unset, leaves it off.
//!
//! # Testing
//!
//! The override is global, so tests that depend on it must not run
//! interleaved. [`scoped`] hands out a [`DebugModeGuard`] that holds a
//! process-wide lock for its lifetime and restores the previous override on
//! drop:
//!
//! ```rust
//! use coded_errors::{debug, Error};
//!
//! let _guard = debug::scoped(false);
//! assert!(Error::new("quiet").stack_trace().is_none());
//! ```

use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Environment variable consulted when no override is set.
pub const DEBUG_MODE_ENV: &str = "DEBUG_MODE";

const UNSET: u8 = 0;
const FORCED_OFF: u8 = 1;
const FORCED_ON: u8 = 2;

static OVERRIDE: AtomicU8 = AtomicU8::new(UNSET);

/// Serializes [`DebugModeGuard`] holders.
static SCOPE_LOCK: Mutex<()> = Mutex::new(());

#[inline]
const fn encode(enabled: bool) -> u8 {
    if enabled { FORCED_ON } else { FORCED_OFF }
}

/// Whether debug mode is active right now.
#[inline]
pub fn is_debug_active() -> bool {
    match OVERRIDE.load(Ordering::Acquire) {
        FORCED_ON => true,
        FORCED_OFF => false,
        _ => env_debug_active(),
    }
}

fn env_debug_active() -> bool {
    std::env::var(DEBUG_MODE_ENV)
        .map(|raw| parse_debug_flag(&raw))
        .unwrap_or(false)
}

/// Interpret a `DEBUG_MODE` value.
pub fn parse_debug_flag(raw: &str) -> bool {
    let raw = raw.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|truthy| raw.eq_ignore_ascii_case(truthy))
}

/// Force debug mode on or off for the whole process.
#[inline]
pub fn set_debug_mode(enabled: bool) {
    OVERRIDE.store(encode(enabled), Ordering::Release);
}

/// Remove the override; the environment decides again.
#[inline]
pub fn clear_debug_mode() {
    OVERRIDE.store(UNSET, Ordering::Release);
}

/// Override debug mode until the returned guard is dropped.
///
/// Blocks while another guard is alive. Not re-entrant: taking a second
/// guard on the same thread deadlocks, use [`DebugModeGuard::set`] instead.
pub fn scoped(enabled: bool) -> DebugModeGuard {
    let lock = SCOPE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = OVERRIDE.swap(encode(enabled), Ordering::AcqRel);
    DebugModeGuard {
        previous,
        _lock: lock,
    }
}

/// Restores the previous debug override on drop.
#[must_use = "debug mode reverts as soon as the guard is dropped"]
pub struct DebugModeGuard {
    previous: u8,
    _lock: MutexGuard<'static, ()>,
}

impl DebugModeGuard {
    /// Change the override while keeping the guard.
    #[inline]
    pub fn set(&self, enabled: bool) {
        set_debug_mode(enabled);
    }
}

impl Drop for DebugModeGuard {
    fn drop(&mut self) {
        OVERRIDE.store(self.previous, Ordering::Release);
    }
}

impl std::fmt::Debug for DebugModeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugModeGuard")
            .field("active", &is_debug_active())
            .finish()
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Render a caller location as `file:line:column`.
#[inline]
pub fn capture_caller(location: &Location<'_>) -> String {
    format!("{}:{}:{}", location.file(), location.line(), location.column())
}

/// Render a backtrace of the current thread.
///
/// Captured unconditionally, independent of `RUST_BACKTRACE`; callers gate
/// on [`is_debug_active`].
pub fn capture_stack_trace() -> Vec<u8> {
    Backtrace::force_capture().to_string().into_bytes()
}
