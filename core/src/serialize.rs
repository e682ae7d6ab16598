//! Wire encoding of request parameters.
//!
//! # Design
//! Every parameter the API accepts is modeled as a `Param`. Absence is
//! `Option::None` at every level: a top-level `None` drops the parameter,
//! while a `None` inside a `Param::List` still occupies a (blank) slot so
//! positional lists keep their shape. The encoded values are raw bytes;
//! percent-encoding is the transport's concern (see `HttpRequest`).
//!
//! The formats below are a wire contract: booleans as `0`/`1`, lists
//! comma-joined, timestamps as `Sat, 01 January 2000 00:00:00 GMT`.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Date format used for timestamp parameters, always rendered in UTC.
pub const DATE_FORMAT: &str = "%a, %d %B %Y %H:%M:%S GMT";

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Timestamp(DateTime<FixedOffset>),
    /// A timestamp without zone information. Interpreted in the host's
    /// local time zone when encoded.
    LocalTimestamp(NaiveDateTime),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Option<Param>>),
}

impl Param {
    /// Convert a decoded JSON value into a parameter.
    ///
    /// `null` maps to `None`. Floats and objects have no wire encoding and
    /// fail with `UnsupportedType`.
    pub fn from_json(value: &Value) -> Result<Option<Param>> {
        let param = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => Param::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Int(i),
                // integers beyond i64 keep their exact decimal text
                None if is_integer_text(&n.to_string()) => Param::Text(n.to_string()),
                None => return Err(ApiError::UnsupportedType { type_name: "float" }),
            },
            Value::String(s) => Param::Text(s.clone()),
            Value::Array(items) => Param::List(
                items
                    .iter()
                    .map(Param::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(_) => return Err(ApiError::UnsupportedType { type_name: "object" }),
        };
        Ok(Some(param))
    }
}

/// Numbers keep their source text, so an integer is one with no fraction
/// or exponent.
fn is_integer_text(text: &str) -> bool {
    !text.contains(['.', 'e', 'E'])
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Param {
            fn from(value: $ty) -> Self {
                Param::Int(i64::from(value))
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<Vec<u8>> for Param {
    fn from(value: Vec<u8>) -> Self {
        Param::Bytes(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Param {
    fn from(value: DateTime<Tz>) -> Self {
        Param::Timestamp(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for Param {
    fn from(value: NaiveDateTime) -> Self {
        Param::LocalTimestamp(value)
    }
}

impl From<&[u8]> for Param {
    fn from(value: &[u8]) -> Self {
        Param::Bytes(value.to_vec())
    }
}

impl<T: Into<Param>> FromIterator<T> for Param {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Param::List(iter.into_iter().map(|v| Some(v.into())).collect())
    }
}

/// Encode one parameter value. `None` stays `None` so the caller can omit
/// the parameter entirely.
///
/// Text is always encoded as UTF-8. Callers that need another character set
/// encode the text themselves and pass `Param::Bytes`.
pub fn encode_scalar(value: Option<&Param>) -> Result<Option<Vec<u8>>> {
    value.map(encode_value).transpose()
}

fn encode_value(value: &Param) -> Result<Vec<u8>> {
    let bytes = match value {
        Param::Bool(b) => u8::from(*b).to_string().into_bytes(),
        Param::Int(i) => i.to_string().into_bytes(),
        Param::Timestamp(dt) => format_timestamp(&dt.with_timezone(&Utc)).into_bytes(),
        Param::LocalTimestamp(naive) => {
            let local = Local
                .from_local_datetime(naive)
                .earliest()
                .ok_or(ApiError::NonexistentLocalTime(*naive))?;
            format_timestamp(&local.with_timezone(&Utc)).into_bytes()
        }
        Param::Text(s) => s.as_bytes().to_vec(),
        Param::Bytes(b) => b.clone(),
        Param::List(items) => {
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                if let Some(item) = item {
                    out.extend(encode_value(item)?);
                }
            }
            out
        }
    };
    Ok(bytes)
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(DATE_FORMAT).to_string()
}

/// Encode named parameters into `(name, bytes)` pairs.
///
/// Accepts anything iterable over `(name, value)`: a map or an ordered list
/// of pairs. Iteration order is preserved and pairs whose value is `None`
/// are dropped. A `None` input yields `None`.
pub fn encode_params<I, K>(params: Option<I>) -> Result<Option<Vec<(String, Vec<u8>)>>>
where
    I: IntoIterator<Item = (K, Option<Param>)>,
    K: Into<String>,
{
    let Some(params) = params else {
        return Ok(None);
    };
    let mut out = Vec::new();
    for (key, value) in params {
        if let Some(bytes) = encode_scalar(value.as_ref())? {
            out.push((key.into(), bytes));
        }
    }
    Ok(Some(out))
}

/// Encode a decoded JSON object as parameters. `null` yields `None`.
pub fn encode_json_params(params: &Value) -> Result<Option<Vec<(String, Vec<u8>)>>> {
    match params {
        Value::Null => Ok(None),
        Value::Object(map) => {
            let pairs = map
                .iter()
                .map(|(k, v)| Ok((k.as_str(), Param::from_json(v)?)))
                .collect::<Result<Vec<_>>>()?;
            encode_params(Some(pairs))
        }
        _ => Err(ApiError::UnexpectedShape {
            expected: "object",
            found: crate::mapper::json_type(params),
        }),
    }
}

/// Values that can be joined with commas into a single parameter string.
///
/// A single string is one word and is never split into characters.
pub trait CommaJoin {
    fn join_comma(&self) -> String;
}

impl CommaJoin for str {
    fn join_comma(&self) -> String {
        self.to_string()
    }
}

impl CommaJoin for String {
    fn join_comma(&self) -> String {
        self.clone()
    }
}

impl<S: AsRef<str>> CommaJoin for [S] {
    fn join_comma(&self) -> String {
        self.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(",")
    }
}

impl<S: AsRef<str>> CommaJoin for Vec<S> {
    fn join_comma(&self) -> String {
        self.as_slice().join_comma()
    }
}

/// Join words with commas, passing a single string through unchanged.
pub fn join_comma<T: CommaJoin + ?Sized>(value: Option<&T>) -> Option<String> {
    value.map(CommaJoin::join_comma)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn encode(value: impl Into<Param>) -> Vec<u8> {
        encode_scalar(Some(&value.into())).unwrap().unwrap()
    }

    #[test]
    fn absent_encodes_to_absent() {
        assert_eq!(encode_scalar(None).unwrap(), None);
    }

    #[test]
    fn booleans_encode_as_integers() {
        assert_eq!(encode(true), b"1");
        assert_eq!(encode(false), b"0");
    }

    #[test]
    fn integers_encode_as_decimal() {
        assert_eq!(encode(123), b"123");
        assert_eq!(encode(-7i64), b"-7");
    }

    #[test]
    fn text_and_bytes_pass_through() {
        assert_eq!(encode("abc"), b"abc");
        assert_eq!(encode("俳句"), "俳句".as_bytes());
        assert_eq!(encode(b"abc".to_vec()), b"abc");
    }

    #[test]
    fn utc_timestamp_uses_wire_date_format() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(encode(dt), b"Sat, 01 January 2000 00:00:00 GMT");
    }

    #[test]
    fn offset_timestamp_is_converted_to_utc() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let dt = jst.with_ymd_and_hms(2000, 1, 1, 9, 0, 0).unwrap();
        assert_eq!(encode(dt), b"Sat, 01 January 2000 00:00:00 GMT");
    }

    #[test]
    fn local_timestamp_is_resolved_in_host_zone() {
        let utc = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let naive = utc.with_timezone(&Local).naive_local();
        assert_eq!(encode(naive), b"Sat, 01 January 2000 00:00:00 GMT");
    }

    #[test]
    fn list_keeps_blank_slots_for_absent_items() {
        let list = Param::List(vec![
            Some(123.into()),
            Some("abc".into()),
            None,
            Some(true.into()),
        ]);
        assert_eq!(encode(list), b"123,abc,,1");
    }

    #[test]
    fn nested_lists_are_flattened_with_commas() {
        let inner: Param = [1, 2].into_iter().collect();
        let list = Param::List(vec![Some(inner), Some(3.into())]);
        assert_eq!(encode(list), b"1,2,3");
    }

    #[test]
    fn float_json_is_unsupported() {
        let err = Param::from_json(&json!(1.5)).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedType { type_name: "float" }));
    }

    #[test]
    fn object_json_is_unsupported() {
        let err = Param::from_json(&json!({"a": 1})).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedType { type_name: "object" }));
    }

    #[test]
    fn json_list_with_null_matches_param_list() {
        let param = Param::from_json(&json!([123, "abc", null, true])).unwrap();
        assert_eq!(encode_scalar(param.as_ref()).unwrap().unwrap(), b"123,abc,,1");
    }

    #[test]
    fn huge_json_integer_keeps_exact_text() {
        let param = Param::from_json(&json!(18446744073709551615u64)).unwrap();
        assert_eq!(param, Some(Param::Text("18446744073709551615".into())));
    }

    #[test]
    fn integer_beyond_u64_keeps_every_digit() {
        let value: Value = serde_json::from_str(r#"{"since_id": 123456789012345678901234}"#).unwrap();
        let pairs = encode_json_params(&value).unwrap().unwrap();
        assert_eq!(pairs, [("since_id".to_string(), b"123456789012345678901234".to_vec())]);

        let float: Value = serde_json::from_str("1.2345678901234567e23").unwrap();
        let err = Param::from_json(&float).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedType { type_name: "float" }));
    }

    #[test]
    fn encode_params_absent_input() {
        let none: Option<Vec<(&str, Option<Param>)>> = None;
        assert_eq!(encode_params(none).unwrap(), None);
    }

    #[test]
    fn encode_params_from_map() {
        let mut map = BTreeMap::new();
        map.insert("a", Some(Param::from(9)));
        map.insert("b", Some(Param::from(true)));
        let pairs: BTreeMap<_, _> = encode_params(Some(map)).unwrap().unwrap().into_iter().collect();
        assert_eq!(pairs["a"], b"9");
        assert_eq!(pairs["b"], b"1");
    }

    #[test]
    fn encode_params_from_pairs_preserves_order_and_drops_absent() {
        let pairs = vec![
            ("z", Some(Param::from("xyz"))),
            ("skip", None),
            ("a", Some(Param::from(1))),
        ];
        let encoded = encode_params(Some(pairs)).unwrap().unwrap();
        assert_eq!(
            encoded,
            vec![("z".to_string(), b"xyz".to_vec()), ("a".to_string(), b"1".to_vec())]
        );
    }

    #[test]
    fn encode_json_params_object() {
        let encoded = encode_json_params(&json!({"a": 9, "b": true, "c": null}))
            .unwrap()
            .unwrap();
        let pairs: BTreeMap<_, _> = encoded.into_iter().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["a"], b"9");
        assert_eq!(pairs["b"], b"1");
    }

    #[test]
    fn encode_json_params_null_is_absent() {
        assert_eq!(encode_json_params(&Value::Null).unwrap(), None);
    }

    #[test]
    fn join_comma_keeps_single_string_whole() {
        assert_eq!(join_comma(Some("haiku")), Some("haiku".to_string()));
        assert_eq!(join_comma(Some(&["haiku", "html"][..])), Some("haiku,html".to_string()));
        assert_eq!(join_comma::<str>(None), None);
    }

    #[test]
    fn join_comma_vec_of_strings() {
        let formats = vec!["haiku".to_string(), "html_touch".to_string()];
        assert_eq!(join_comma(Some(&formats)), Some("haiku,html_touch".to_string()));
    }

    #[test]
    fn naive_datetime_converts_to_local_variant() {
        let naive = NaiveDate::from_ymd_opt(2010, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(Param::from(naive), Param::LocalTimestamp(naive));
    }
}
