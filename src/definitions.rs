//! Predefined error codes shared across services.
//!
//! # Taxonomy
//!
//! Codes are grouped by role, each group in its own numeric range. Inside a
//! range the value is `base + http_status`, so the low three digits always
//! carry the transport status:
//!
//! - **Client** (40000): malformed requests, validation, auth, not-found, throttling
//! - **System** (50000): storage, locks, serialization, upstream failures
//! - **Streaming** (60000): queue/stream processing
//! - **State machine** (70000): transition and state violations
//! - **Generic** (90000): bootstrap and catch-all failures
//!
//! # Sentinels
//!
//! Four codes have library-level meaning:
//!
//! | Sentinel | Wire form | Role |
//! |---|---|---|
//! | [`UNKNOWN`] | `UnknownError-50500` | default code of a new error |
//! | [`GENERIC`] | `GenericErrorCode-90500` | fallback for malformed wire codes |
//! | [`INVALID_FORM_DATA`] | `InvalidFormDataError-40422` | validation failures |
//! | [`JOINED`] | `JoinedError-50300` | composite produced by [`join`](crate::join) |
//!
//! `UNKNOWN` and `GENERIC` are "no-op" codes: errors carrying them display
//! their message without a code prefix.
//!
//! # Governance
//!
//! The catalog is initialized at compile time and never mutated. Range and
//! uniqueness rules are enforced by the `tests` module at the bottom of this
//! file; adding a code outside its range fails the build's test suite.

use crate::{define_error_code, define_error_codes, ErrorCode};

/// HTTP status codes used by the catalog.
pub mod http {
    pub const SUCCESS: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_AUTHENTICATED: u16 = 401;
    pub const LOST_ACCESS: u16 = 402;
    pub const ENDPOINT_FORBIDDEN: u16 = 403;
    /// Entity or endpoint not found. The message tells the two apart.
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    /// Missing service security key in the request headers.
    pub const SECURITY_KEY_MISSING: u16 = 407;
    pub const REQUEST_TIMEOUT: u16 = 408;
    pub const CONFLICT: u16 = 409;
    pub const GONE: u16 = 410;
    pub const PRECONDITION_FAILED: u16 = 412;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
    pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
    pub const RANGE_NOT_SATISFIABLE: u16 = 416;
    pub const INVALID_DATA: u16 = 422;
    pub const LOCKED: u16 = 423;
    pub const THROTTLING: u16 = 429;
    pub const SERVER_ERROR: u16 = 500;
    /// Also used for an uncompleted registration process.
    pub const NOT_IMPLEMENTED: u16 = 501;
    pub const BAD_GATEWAY: u16 = 502;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// Range bases. A code's value is `base + http_status`.
pub mod ranges {
    pub const CLIENT_BASE: i64 = 40_000;
    pub const SYSTEM_BASE: i64 = 50_000;
    pub const STREAM_BASE: i64 = 60_000;
    pub const STATE_MACHINE_BASE: i64 = 70_000;
    pub const GENERIC_BASE: i64 = 90_000;

    /// Width of every range.
    pub const RANGE_WIDTH: i64 = 10_000;
}

use ranges::*;

// -----------------------------------------------------------------------------
// Client errors (40000) - caller sent something we cannot serve
// -----------------------------------------------------------------------------
define_error_codes! {
    /// All client-input codes.
    CLIENT_ERRORS, CLIENT_BASE => {
        BAD_REQUEST                  = ("BadRequestError", http::BAD_REQUEST),
        ERROR_PERFORMING_REQUEST     = ("ErrorPerformingRequestError", http::BAD_REQUEST),
        INVALID_QUERY_PARAMS         = ("InvalidQueryParamsError", http::BAD_REQUEST),
        INVALID_PATH_PARAMS          = ("InvalidPathParamsError", http::BAD_REQUEST),
        UNAUTHORIZED                 = ("UnauthorizedError", http::NOT_AUTHENTICATED),
        INVALID_JWT                  = ("InvalidJWTError", http::NOT_AUTHENTICATED),
        EXPIRED_JWT                  = ("ExpiredJWTError", http::NOT_AUTHENTICATED),
        INVALID_CREDENTIALS          = ("InvalidCredentialsError", http::NOT_AUTHENTICATED),
        LOST_ACCESS                  = ("LostAccessError", http::LOST_ACCESS),
        FORBIDDEN                    = ("ForbiddenError", http::ENDPOINT_FORBIDDEN),
        INSUFFICIENT_PERMISSIONS     = ("InsufficientPermissionsError", http::ENDPOINT_FORBIDDEN),
        NOT_FOUND                    = ("NotFoundError", http::NOT_FOUND),
        USER_NOT_FOUND               = ("UserNotFoundError", http::NOT_FOUND),
        ENTITY_NOT_FOUND             = ("EntityNotFoundError", http::NOT_FOUND),
        ROUTE_NOT_FOUND              = ("RouteNotFoundError", http::NOT_FOUND),
        METHOD_NOT_ALLOWED           = ("MethodNotAllowedError", http::METHOD_NOT_ALLOWED),
        INVALID_AUTH_TOKEN           = ("InvalidAuthTokenError", http::SECURITY_KEY_MISSING),
        REQUEST_TIMEOUT              = ("RequestTimeoutError", http::REQUEST_TIMEOUT),
        CONFLICT                     = ("ConflictError", http::CONFLICT),
        DUPLICATE_ENTITY             = ("DuplicateEntityError", http::CONFLICT),
        GONE                         = ("GoneError", http::GONE),
        PRECONDITION_FAILED          = ("PreconditionFailedError", http::PRECONDITION_FAILED),
        PAYLOAD_TOO_LARGE            = ("PayloadTooLargeError", http::PAYLOAD_TOO_LARGE),
        UNSUPPORTED_MEDIA_TYPE       = ("UnsupportedMediaTypeError", http::UNSUPPORTED_MEDIA_TYPE),
        /// Sentinel: validation failures. See [`Error::validation`](crate::Error::validation).
        INVALID_FORM_DATA            = ("InvalidFormDataError", http::INVALID_DATA),
        ERROR_UNMARSHALL_BODY        = ("ErrorUnmarshallBodyError", http::INVALID_DATA),
        RESOURCE_LOCKED              = ("ResourceLockedError", http::LOCKED),
        TOO_MANY_ATTEMPTS            = ("TooManyAttemptsError", http::THROTTLING),
        RATE_LIMIT_EXCEEDED          = ("RateLimitExceededError", http::THROTTLING),
    }
}

// -----------------------------------------------------------------------------
// System errors (50000) - we failed, the caller did nothing wrong
// -----------------------------------------------------------------------------
define_error_codes! {
    /// All system codes.
    SYSTEM_ERRORS, SYSTEM_BASE => {
        FAILED_TO_WRITE_DATA         = ("FailedToWriteDataError", http::SERVER_ERROR),
        FAILED_TO_READ_DATA          = ("FailedToReadDataError", http::SERVER_ERROR),
        DB_ERROR                     = ("DBError", http::SERVER_ERROR),
        DB_TRANSACTION               = ("DBTransactionError", http::SERVER_ERROR),
        DB_CONNECTION                = ("DBConnectionError", http::SERVICE_UNAVAILABLE),
        /// Sentinel: default code of a freshly built error.
        UNKNOWN                      = ("UnknownError", http::SERVER_ERROR),
        INVALID_PROCESS_HANDLER      = ("InvalidProcessHandlerError", http::SERVER_ERROR),
        INVALID_CTX_METRIC           = ("InvalidCtxMetricError", http::SERVER_ERROR),
        ERROR_CREATING_METRIC        = ("ErrorCreatingMetricError", http::SERVER_ERROR),
        EVENT_SOURCE_MAPPING_MISSING = ("EventSourceMappingDontExistError", http::SERVER_ERROR),
        LOCK_ACQUISITION             = ("LockAcquisitionError", http::SERVER_ERROR),
        LOCK_RELEASE                 = ("LockReleaseError", http::SERVER_ERROR),
        CACHE_ERROR                  = ("CacheError", http::SERVER_ERROR),
        CONFIGURATION_ERROR          = ("ConfigurationError", http::SERVER_ERROR),
        SERIALIZATION_ERROR          = ("SerializationError", http::SERVER_ERROR),
        DESERIALIZATION_ERROR        = ("DeserializationError", http::SERVER_ERROR),
        ENCRYPTION_ERROR             = ("EncryptionError", http::SERVER_ERROR),
        DECRYPTION_ERROR             = ("DecryptionError", http::SERVER_ERROR),
        INCOMPLETE_REGISTRATION      = ("IncompleteRegistrationError", http::NOT_IMPLEMENTED),
        NOT_IMPLEMENTED              = ("NotImplementedError", http::NOT_IMPLEMENTED),
        UPSTREAM_SERVICE             = ("UpstreamServiceError", http::BAD_GATEWAY),
        SERVICE_UNAVAILABLE          = ("ServiceUnavailableError", http::SERVICE_UNAVAILABLE),
        UPSTREAM_TIMEOUT             = ("UpstreamTimeoutError", http::GATEWAY_TIMEOUT),
    }
}

define_error_code! {
    /// Sentinel: composite of two or more errors built by [`join`](crate::join).
    ///
    /// Its value predates the `base + status` convention and is kept for
    /// wire compatibility.
    JOINED = ("JoinedError", SYSTEM_BASE + 300, http::SERVER_ERROR)
}

// -----------------------------------------------------------------------------
// Streaming errors (60000) - queue and stream processing
// -----------------------------------------------------------------------------
define_error_codes! {
    /// All streaming/queue codes.
    STREAM_ERRORS, STREAM_BASE => {
        STREAM_NOT_FOUND             = ("StreamNotFoundError", http::NOT_FOUND),
        STREAM_CLOSED                = ("StreamClosedError", http::GONE),
        STREAM_MESSAGE_TOO_LARGE     = ("StreamMessageTooLargeError", http::PAYLOAD_TOO_LARGE),
        STREAM_OFFSET_OUT_OF_RANGE   = ("StreamOffsetOutOfRangeError", http::RANGE_NOT_SATISFIABLE),
        STREAM_MESSAGE_MALFORMED     = ("StreamMessageMalformedError", http::INVALID_DATA),
        STREAM_BACKPRESSURE          = ("StreamBackpressureError", http::THROTTLING),
        STREAM_PUBLISH               = ("StreamPublishError", http::SERVER_ERROR),
        STREAM_CONSUME               = ("StreamConsumeError", http::SERVER_ERROR),
        STREAM_ACK                   = ("StreamAckError", http::SERVER_ERROR),
        STREAM_CONSUMER_GROUP        = ("StreamConsumerGroupError", http::SERVER_ERROR),
        DEAD_LETTER                  = ("DeadLetterError", http::SERVER_ERROR),
        QUEUE_FULL                   = ("QueueFullError", http::SERVICE_UNAVAILABLE),
    }
}

// -----------------------------------------------------------------------------
// State machine errors (70000) - transition and state violations
// -----------------------------------------------------------------------------
define_error_codes! {
    /// All state-machine codes.
    STATE_MACHINE_ERRORS, STATE_MACHINE_BASE => {
        TRANSITION_NOT_ALLOWED       = ("TransitionNotAllowedError", http::ENDPOINT_FORBIDDEN),
        STATE_MACHINE_NOT_FOUND      = ("StateMachineNotFoundError", http::NOT_FOUND),
        INVALID_STATE                = ("InvalidStateError", http::CONFLICT),
        INVALID_TRANSITION           = ("InvalidTransitionError", http::CONFLICT),
        TERMINAL_STATE               = ("TerminalStateError", http::CONFLICT),
        TRANSITION_GUARD_REJECTED    = ("TransitionGuardRejectedError", http::PRECONDITION_FAILED),
        UNKNOWN_EVENT                = ("UnknownEventError", http::INVALID_DATA),
        STATE_MACHINE_LOCKED         = ("StateMachineLockedError", http::LOCKED),
        STATE_MACHINE_CONFIG         = ("StateMachineConfigError", http::SERVER_ERROR),
        STATE_TRANSITION_FAILED      = ("StateTransitionFailedError", http::SERVER_ERROR),
    }
}

// -----------------------------------------------------------------------------
// Generic errors (90000) - bootstrap and catch-all
// -----------------------------------------------------------------------------
define_error_codes! {
    /// All generic codes.
    GENERIC_ERRORS, GENERIC_BASE => {
        /// Sentinel: fallback for codes that cannot be decoded.
        GENERIC                      = ("GenericErrorCode", http::SERVER_ERROR),
        ERROR_CREATING_DEPENDENCY    = ("ErrorCreatingDependencyError", http::SERVER_ERROR),
        ERROR_LOADING_STRUCT_CONSUL  = ("ErrorLoadingStructConsulError", http::SERVER_ERROR),
        ERROR_LOADING_CONFIGURATION  = ("ErrorLoadingConfigurationError", http::SERVER_ERROR),
        MISSING_ENVIRONMENT_VARIABLE = ("MissingEnvironmentVariableError", http::SERVER_ERROR),
    }
}

/// Addressable copy of [`GENERIC`] for accessors that hand out references.
pub(crate) static GENERIC_REF: ErrorCode = GENERIC;

/// Every predefined group, in range order. [`JOINED`] is listed last.
const GROUPS: &[&[ErrorCode]] = &[
    CLIENT_ERRORS,
    SYSTEM_ERRORS,
    STREAM_ERRORS,
    STATE_MACHINE_ERRORS,
    GENERIC_ERRORS,
    &[JOINED],
];

/// Iterate over every predefined code.
pub fn catalog() -> impl Iterator<Item = &'static ErrorCode> {
    GROUPS.iter().flat_map(|group| group.iter())
}

/// Find a predefined code by its identity.
///
/// Useful on the receiving side to recover the catalog's explicit HTTP status
/// after a wire round-trip recomputed it.
pub fn lookup(name: &str, value: i64) -> Option<&'static ErrorCode> {
    catalog().find(|code| code.value() == value && code.name() == name)
}

/// Whether `code` is a no-op sentinel (displayed without a code prefix).
#[inline]
pub fn is_noop(code: &ErrorCode) -> bool {
    *code == UNKNOWN || *code == GENERIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_in_range(group: &[ErrorCode], base: i64) {
        for code in group {
            assert!(
                code.value() >= base && code.value() < base + RANGE_WIDTH,
                "{} outside range starting at {}",
                code,
                base
            );
        }
    }

    #[test]
    fn enforce_group_ranges() {
        assert_in_range(CLIENT_ERRORS, CLIENT_BASE);
        assert_in_range(SYSTEM_ERRORS, SYSTEM_BASE);
        assert_in_range(STREAM_ERRORS, STREAM_BASE);
        assert_in_range(STATE_MACHINE_ERRORS, STATE_MACHINE_BASE);
        assert_in_range(GENERIC_ERRORS, GENERIC_BASE);
    }

    #[test]
    fn catalog_codes_carry_status_in_low_digits() {
        for code in catalog().filter(|code| **code != JOINED) {
            assert!(code.is_http_derived(), "{} has a mismatched status", code);
        }
    }

    #[test]
    fn catalog_identities_are_unique() {
        let mut seen = HashSet::new();
        for code in catalog() {
            assert!(seen.insert(code.clone()), "duplicate code {}", code);
        }
        assert!(seen.len() >= 75);
    }

    #[test]
    fn sentinels_have_expected_wire_forms() {
        assert_eq!(UNKNOWN.to_string(), "UnknownError-50500");
        assert_eq!(GENERIC.to_string(), "GenericErrorCode-90500");
        assert_eq!(INVALID_FORM_DATA.to_string(), "InvalidFormDataError-40422");
        assert_eq!(JOINED.to_string(), "JoinedError-50300");
        assert_eq!(JOINED.http_error(), 500);
    }

    #[test]
    fn noop_sentinels() {
        assert!(is_noop(&UNKNOWN));
        assert!(is_noop(&GENERIC));
        assert!(!is_noop(&JOINED));
        assert!(!is_noop(&NOT_FOUND));
    }

    #[test]
    fn lookup_finds_catalog_entries() {
        assert_eq!(lookup("NotFoundError", 40404), Some(&NOT_FOUND));
        assert_eq!(lookup("JoinedError", 50300), Some(&JOINED));
        assert_eq!(lookup("NotFoundError", 40405), None);
    }
}
