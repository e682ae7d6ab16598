//! Error types for the Haiku API client.
//!
//! # Design
//! A single `ApiError` covers every failure the core can report, from
//! parameter encoding through response mapping. The serializer and mapper
//! variants are raised directly by the function that detects them; the
//! HTTP variants are produced by the `parse_*` methods and `Transport`
//! implementations. `NotFound` keeps a dedicated variant because callers
//! routinely distinguish a missing entry or user from other failures.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::types::RecordKind;

/// Errors returned by the serializer, the response mapper and the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter value has no wire encoding.
    #[error("{type_name} is an unsupported parameter type")]
    UnsupportedType { type_name: &'static str },

    /// A required field is absent from a decoded response.
    #[error("{record:?} is missing required field `{field}`")]
    MissingField {
        record: RecordKind,
        field: &'static str,
    },

    /// A field is present but cannot be converted to its declared type.
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeCoercion {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A timestamp string matches neither accepted wire format.
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// A naive timestamp falls into a local-time gap (e.g. a DST jump).
    #[error("local time {0} does not exist in the host time zone")]
    NonexistentLocalTime(NaiveDateTime),

    /// The decoded body has the wrong JSON shape for the requested records.
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    /// An API path contains characters or segments that are never sent.
    #[error("suspicious path: {0:?}")]
    SuspiciousPath(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body is not valid JSON or form data.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The host transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
