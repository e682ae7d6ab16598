//! Synchronous client core for the Haiku microblogging API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Two layers do the real
//! work:
//!
//! - `serialize` turns parameter values into the API's wire encoding
//!   (`0`/`1` booleans, comma-joined lists, GMT date strings).
//! - `mapper` turns decoded JSON into the typed records in `types`,
//!   coercing the server's loosely typed scalars and parsing timestamps.
//!
//! `HaikuClient` composes both into one `build_*` method per endpoint and
//! one `parse_*` method per record kind. `Session` optionally runs the
//! round-trip through a host-supplied `Transport`.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod mapper;
pub mod oauth;
pub mod options;
pub mod serialize;
pub mod session;
pub mod types;

pub use auth::{Credentials, OAuthCredentials};
pub use client::{HaikuClient, DEFAULT_ROOT, DEFAULT_USER_AGENT};
pub use error::ApiError;
pub use http::{Attachment, HttpMethod, HttpRequest, HttpResponse};
pub use mapper::{build_list, build_record, parse_list, parse_record, parse_timestamp, FromJson};
pub use oauth::{authorize_url, TokenPair};
pub use options::{KeywordOptions, NewStatus, TimelineOptions};
pub use serialize::{encode_json_params, encode_params, encode_scalar, join_comma, Param};
pub use session::{Interceptor, Session, TraceExchanges, Transport};
pub use types::{Keyword, Record, RecordKind, Status, Target, User};
