//! Conversion of decoded JSON into typed records.
//!
//! # Design
//! Each record implements `FromJson` by reading its field table through a
//! `Fields` view over the JSON object. Required fields fail with
//! `MissingField` when absent; optional fields become `None` when absent or
//! `null`. Nested records and lists recurse through `FromJson`, so a
//! `Status` with replies is built depth-first in wire order.
//!
//! The server is loose with scalar types (counts arrive as strings, IDs as
//! numbers), so coercion accepts both and normalizes: strings keep the
//! exact decimal text of numbers, integers parse from strings.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::types::{Keyword, Record, RecordKind, Status, Target, User};

/// Records that can be built from one decoded JSON object.
pub trait FromJson: Sized {
    const KIND: RecordKind;

    fn from_fields(fields: &Fields<'_>) -> Result<Self>;

    fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or(ApiError::UnexpectedShape {
            expected: "object",
            found: json_type(value),
        })?;
        Self::from_fields(&Fields {
            kind: Self::KIND,
            object,
        })
    }
}

/// Build a single typed record.
pub fn parse_record<T: FromJson>(value: &Value) -> Result<T> {
    T::from_json(value)
}

/// Build a list of typed records, failing on the first bad element.
pub fn parse_list<T: FromJson>(value: &Value) -> Result<Vec<T>> {
    let items = value.as_array().ok_or(ApiError::UnexpectedShape {
        expected: "array",
        found: json_type(value),
    })?;
    items.iter().map(T::from_json).collect()
}

/// Build a record of the given kind.
pub fn build_record(kind: RecordKind, value: &Value) -> Result<Record> {
    let record = match kind {
        RecordKind::Status => Status::from_json(value)?.into(),
        RecordKind::User => User::from_json(value)?.into(),
        RecordKind::Keyword => Keyword::from_json(value)?.into(),
        RecordKind::Target => Target::from_json(value)?.into(),
    };
    Ok(record)
}

/// Build a list of records of the given kind, preserving order.
pub fn build_list(kind: RecordKind, value: &Value) -> Result<Vec<Record>> {
    let items = value.as_array().ok_or(ApiError::UnexpectedShape {
        expected: "array",
        found: json_type(value),
    })?;
    items.iter().map(|item| build_record(kind, item)).collect()
}

/// Parse a wire timestamp such as `2010-01-02T03:04:05Z` or
/// `2010-01-02T03:04:05.026490+09:00`.
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>> {
    let mut normalized = text.replace('Z', "+00:00").replace('T', " ");
    let len = normalized.len();
    if len >= 3 && normalized.as_bytes()[len - 3] == b':' {
        normalized.remove(len - 3);
    }
    DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%z"))
        .map_err(|_| ApiError::MalformedTimestamp(text.to_string()))
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field accessors over one JSON object, tagged with the record being built.
pub struct Fields<'a> {
    kind: RecordKind,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn required(&self, field: &'static str) -> Result<&'a Value> {
        self.object.get(field).ok_or(ApiError::MissingField {
            record: self.kind,
            field,
        })
    }

    fn optional(&self, field: &'static str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    pub fn string(&self, field: &'static str) -> Result<String> {
        to_string(field, self.required(field)?)
    }

    pub fn opt_string(&self, field: &'static str) -> Result<Option<String>> {
        self.optional(field).map(|v| to_string(field, v)).transpose()
    }

    pub fn int(&self, field: &'static str) -> Result<i64> {
        to_int(field, self.required(field)?)
    }

    pub fn timestamp(&self, field: &'static str) -> Result<DateTime<FixedOffset>> {
        match self.required(field)? {
            Value::String(s) => parse_timestamp(s),
            other => Err(coercion(field, "timestamp string", other)),
        }
    }

    pub fn record<T: FromJson>(&self, field: &'static str) -> Result<T> {
        T::from_json(self.required(field)?)
    }

    pub fn opt_record<T: FromJson>(&self, field: &'static str) -> Result<Option<T>> {
        self.optional(field).map(T::from_json).transpose()
    }

    pub fn opt_records<T: FromJson>(&self, field: &'static str) -> Result<Option<Vec<T>>> {
        self.optional(field)
            .map(|v| match v {
                Value::Array(items) => items.iter().map(T::from_json).collect(),
                other => Err(coercion(field, "array", other)),
            })
            .transpose()
    }

    pub fn opt_strings(&self, field: &'static str) -> Result<Option<Vec<String>>> {
        self.optional(field)
            .map(|v| match v {
                Value::Array(items) => items.iter().map(|item| to_string(field, item)).collect(),
                other => Err(coercion(field, "array", other)),
            })
            .transpose()
    }
}

fn coercion(field: &'static str, expected: &'static str, found: &Value) -> ApiError {
    ApiError::TypeCoercion {
        field,
        expected,
        found: json_type(found).to_string(),
    }
}

fn to_string(field: &'static str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        other => Err(coercion(field, "string", other)),
    }
}

fn to_int(field: &'static str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| ApiError::TypeCoercion {
            field,
            expected: "integer",
            found: n.to_string(),
        }),
        Value::String(s) => s.trim().parse().map_err(|_| ApiError::TypeCoercion {
            field,
            expected: "integer",
            found: format!("{s:?}"),
        }),
        other => Err(coercion(field, "integer", other)),
    }
}

impl FromJson for Status {
    const KIND: RecordKind = RecordKind::Status;

    fn from_fields(f: &Fields<'_>) -> Result<Self> {
        Ok(Status {
            link: f.string("link")?,
            created_at: f.timestamp("created_at")?,
            favorited: f.int("favorited")?,
            haiku_text: f.opt_string("haiku_text")?,
            html: f.opt_string("html")?,
            html_touch: f.opt_string("html_touch")?,
            html_mobile: f.opt_string("html_mobile")?,
            id: f.string("id")?,
            in_reply_to_status_id: f.opt_string("in_reply_to_status_id")?,
            in_reply_to_user_id: f.opt_string("in_reply_to_user_id")?,
            keyword: f.opt_string("keyword")?,
            replies: f.opt_records("replies")?,
            source: f.string("source")?,
            target: f.opt_record("target")?,
            text: f.opt_string("text")?,
            user: f.record("user")?,
        })
    }
}

impl FromJson for User {
    const KIND: RecordKind = RecordKind::User;

    fn from_fields(f: &Fields<'_>) -> Result<Self> {
        Ok(User {
            followers_count: f.int("followers_count")?,
            name: f.string("name")?,
            id: f.string("id")?,
            profile_image_url: f.string("profile_image_url")?,
            screen_name: f.string("screen_name")?,
            url: f.string("url")?,
        })
    }
}

impl FromJson for Keyword {
    const KIND: RecordKind = RecordKind::Keyword;

    fn from_fields(f: &Fields<'_>) -> Result<Self> {
        Ok(Keyword {
            entry_count: f.int("entry_count")?,
            followers_count: f.int("followers_count")?,
            link: f.string("link")?,
            related_keywords: f.opt_strings("related_keywords")?,
            title: f.string("title")?,
            word: f.string("word")?,
            url_name: f.opt_string("url_name")?,
        })
    }
}

impl FromJson for Target {
    const KIND: RecordKind = RecordKind::Target;

    fn from_fields(f: &Fields<'_>) -> Result<Self> {
        Ok(Target {
            title: f.string("title")?,
            word: f.string("word")?,
            url_name: f.opt_string("url_name")?,
        })
    }
}
