//! JSON wire format.
//!
//! # ErrorCode
//!
//! A single string, `"<Name>-<Value>"`. Decoding is lenient:
//!
//! - the string is split at the first `-` and the remainder parsed as `i64`
//! - on success the HTTP status is recomputed as `value mod 1000`, whatever
//!   the sender's catalog said
//! - on failure, or if the JSON value is not a string at all, a warning is
//!   logged and [`GENERIC`](definitions::GENERIC) is used
//!
//! # Error
//!
//! ```json
//! {
//!   "code": "UserNotFoundError-40404",
//!   "message": "user 7",
//!   "nested_error": [{"code": "DBError-50500", "message": "timeout"}, "plain text cause"],
//!   "stack_trace": {"trace": "<base64>", "caller": "src/users.rs:42:9"},
//!   "field_errors": [{"field": "id", "rule": "min", "rule_param": "1", "message": "too small"}]
//! }
//! ```
//!
//! `stack_trace.trace` holds raw bytes encoded as standard base64. A trace
//! that does not decode is kept as its text, with a warning.
//!
//! Every key except `code` is omitted when empty. `stack_trace` is emitted
//! only when debug mode is active *at encode time*, even if the error
//! carries a trace.
//!
//! Structured nested causes are encoded as objects, opaque ones as their
//! message string. On decode an entry that reads as an error object becomes
//! a structured cause, a string becomes an opaque cause, and anything else
//! is dropped with a warning. A missing `code` decodes as `GENERIC`.
//!
//! Warnings are emitted only after the whole document has matched, so an
//! object that is tried as an error and then dropped is reported once.
//!
//! Decoding fails only on malformed JSON or when the document is not an
//! object.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::codes::ErrorCode;
use crate::debug;
use crate::definitions;
use crate::logging::WireWarning;
use crate::models::{Cause, Causes, Error, FieldError, OpaqueError, StackTrace};

// ============================================================================
// ErrorCode
// ============================================================================

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Lenient parse of a wire code. Never fails.
pub(crate) fn decode_code(raw: &str) -> ErrorCode {
    match ErrorCode::split_wire(raw) {
        Ok((name, value)) => ErrorCode::from_wire_parts(name.to_owned(), value),
        Err(reason) => {
            WireWarning::MalformedCode {
                raw,
                reason: &reason,
            }
            .emit();
            definitions::GENERIC
        }
    }
}

/// A `code` value as it appeared on the wire, not yet judged.
///
/// Reading one never logs. Warnings are emitted by [`CodeIn::resolve`], so
/// a branch abandoned by an untagged enum leaves no trace in the logs.
#[derive(Debug, Default)]
enum CodeIn {
    #[default]
    Missing,
    Text(String),
    NonString(&'static str),
}

impl CodeIn {
    fn resolve(self) -> ErrorCode {
        match self {
            Self::Missing => definitions::GENERIC,
            Self::Text(raw) => decode_code(&raw),
            Self::NonString(kind) => {
                WireWarning::NonStringCode { kind }.emit();
                definitions::GENERIC
            }
        }
    }
}

struct CodeInVisitor;

impl<'de> Visitor<'de> for CodeInVisitor {
    type Value = CodeIn;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an error code string of the form <name>-<value>")
    }

    fn visit_str<E: de::Error>(self, raw: &str) -> Result<CodeIn, E> {
        Ok(CodeIn::Text(raw.to_owned()))
    }

    fn visit_string<E: de::Error>(self, raw: String) -> Result<CodeIn, E> {
        Ok(CodeIn::Text(raw))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("number"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("null"))
    }

    fn visit_none<E: de::Error>(self) -> Result<CodeIn, E> {
        Ok(CodeIn::NonString("null"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<CodeIn, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(CodeIn::NonString("array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CodeIn, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(CodeIn::NonString("object"))
    }
}

impl<'de> Deserialize<'de> for CodeIn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CodeInVisitor)
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        CodeIn::deserialize(deserializer).map(CodeIn::resolve)
    }
}

// ============================================================================
// FieldError / StackTrace
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(remote = "FieldError")]
struct FieldErrorWire {
    #[serde(default)]
    field: String,
    #[serde(default)]
    rule: String,
    #[serde(default, rename = "rule_param")]
    param: String,
    #[serde(default)]
    message: String,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FieldErrorWire::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for FieldError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FieldErrorWire::deserialize(deserializer)
    }
}

fn serialize_base64<S: Serializer>(bytes: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

/// `trace` is raw bytes and travels as standard base64.
#[derive(Serialize)]
struct StackTraceOut<'a> {
    #[serde(
        skip_serializing_if = "is_empty_slice",
        serialize_with = "serialize_base64"
    )]
    trace: &'a [u8],
    #[serde(skip_serializing_if = "is_empty_str")]
    caller: &'a str,
}

impl Serialize for StackTrace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StackTraceOut {
            trace: &self.trace,
            caller: &self.caller,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct StackTraceIn {
    #[serde(default)]
    trace: Option<String>,
    #[serde(default)]
    caller: Option<String>,
}

impl StackTraceIn {
    /// Text that is not base64 is kept as its own bytes.
    fn resolve(self) -> StackTrace {
        let raw = self.trace.unwrap_or_default();
        let trace = match BASE64.decode(&raw) {
            Ok(bytes) => bytes,
            Err(_) => {
                WireWarning::UndecodableTrace { raw: &raw }.emit();
                raw.into_bytes()
            }
        };

        StackTrace {
            trace,
            caller: self.caller.unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for StackTrace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StackTraceIn::deserialize(deserializer).map(StackTraceIn::resolve)
    }
}

// ============================================================================
// Error
// ============================================================================

fn is_empty_str(s: &&str) -> bool {
    s.is_empty()
}

fn is_empty_slice<T>(s: &&[T]) -> bool {
    s.is_empty()
}

#[derive(Serialize)]
struct ErrorOut<'a> {
    code: &'a ErrorCode,
    #[serde(skip_serializing_if = "is_empty_str")]
    message: &'a str,
    #[serde(skip_serializing_if = "is_empty_slice")]
    nested_error: &'a [Cause],
    #[serde(skip_serializing_if = "Option::is_none")]
    stack_trace: Option<&'a StackTrace>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    field_errors: &'a [FieldError],
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stack_trace = if debug::is_debug_active() {
            self.stack_trace()
        } else {
            None
        };

        ErrorOut {
            code: self.code(),
            message: self.message(),
            nested_error: self.nested_errors(),
            stack_trace,
            field_errors: self.field_errors(),
        }
        .serialize(serializer)
    }
}

impl Serialize for Cause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Structured(err) => err.serialize(serializer),
            Self::Opaque(opaque) => serializer.serialize_str(opaque.message()),
        }
    }
}

/// One `nested_error` entry, tried in declaration order.
///
/// Nothing is logged while an entry is being matched; see [`ObjectIn`].
#[derive(Deserialize)]
#[serde(untagged)]
enum NestedIn {
    Structured(ObjectIn),
    Opaque(String),
    Unsupported(serde_json::Value),
}

impl NestedIn {
    fn resolve(self) -> Option<Cause> {
        match self {
            Self::Structured(object) => Some(Cause::from(object.resolve())),
            Self::Opaque(message) => Some(Cause::Opaque(OpaqueError::new(message))),
            Self::Unsupported(value) => {
                let raw = value.to_string();
                WireWarning::DroppedNested {
                    kind: json_kind(&value),
                    raw: &raw,
                }
                .emit();
                None
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[derive(Deserialize)]
struct ErrorIn {
    #[serde(default)]
    code: CodeIn,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    nested_error: Option<Vec<NestedIn>>,
    #[serde(default)]
    stack_trace: Option<StackTraceIn>,
    #[serde(default)]
    field_errors: Option<Vec<FieldError>>,
}

/// An error object read from the wire, not yet resolved.
///
/// Only JSON objects are accepted; a derived struct would also take arrays.
/// Decoder warnings for the whole tree are emitted by [`ObjectIn::resolve`],
/// once the document has fully matched.
struct ObjectIn(ErrorIn);

impl ObjectIn {
    fn resolve(self) -> Error {
        let wire = self.0;
        let code = wire.code.resolve();
        let trace = wire.stack_trace.map(StackTraceIn::resolve);
        let nested: Causes = wire
            .nested_error
            .unwrap_or_default()
            .into_iter()
            .filter_map(NestedIn::resolve)
            .collect();

        Error::from_parts(
            code,
            wire.message.unwrap_or_default(),
            trace,
            nested,
            wire.field_errors.unwrap_or_default(),
        )
    }
}

struct ObjectInVisitor;

impl<'de> Visitor<'de> for ObjectInVisitor {
    type Value = ObjectIn;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an error object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<ObjectIn, A::Error> {
        ErrorIn::deserialize(de::value::MapAccessDeserializer::new(map)).map(ObjectIn)
    }
}

impl<'de> Deserialize<'de> for ObjectIn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ObjectInVisitor)
    }
}

impl<'de> Deserialize<'de> for Error {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ObjectIn::deserialize(deserializer).map(ObjectIn::resolve)
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Error {
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Encode as compact JSON bytes, e.g. for an HTTP body.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode from JSON bytes.
    pub fn from_json_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}
