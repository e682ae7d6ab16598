//! Verify the serializer and mapper against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector file lists inputs with their expected outputs or error
//! variant, so the wire contract is pinned down in data rather than code.

use haiku_core::{
    build_record, encode_scalar, parse_record, parse_timestamp, ApiError, Keyword, Param, Record,
    RecordKind, Status, User,
};
use serde_json::Value;

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn parse_kind(s: &str) -> RecordKind {
    match s {
        "Status" => RecordKind::Status,
        "User" => RecordKind::User,
        "Keyword" => RecordKind::Keyword,
        "Target" => RecordKind::Target,
        other => panic!("unknown kind: {other}"),
    }
}

fn error_name(err: &ApiError) -> &'static str {
    match err {
        ApiError::UnsupportedType { .. } => "UnsupportedType",
        ApiError::MissingField { .. } => "MissingField",
        ApiError::TypeCoercion { .. } => "TypeCoercion",
        ApiError::MalformedTimestamp(_) => "MalformedTimestamp",
        other => panic!("unexpected error: {other}"),
    }
}

fn encode_json(value: &Value) -> Result<Option<Vec<u8>>, ApiError> {
    let param = Param::from_json(value)?;
    encode_scalar(param.as_ref())
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

#[test]
fn encode_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/encode.json"));

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = encode_json(&case["value"]);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}");
        } else {
            let encoded = result.unwrap();
            let expected = case["expected"].as_str().map(|s| s.as_bytes().to_vec());
            assert_eq!(encoded, expected, "{name}");
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[test]
fn timestamp_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/timestamps.json"));

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = parse_timestamp(case["text"].as_str().unwrap());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}");
        } else {
            let dt = result.unwrap();
            assert_eq!(dt.to_rfc3339(), case["expected"].as_str().unwrap(), "{name}");
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn status_fixture_maps_every_field() {
    let vectors = load(include_str!("../../test-vectors/records.json"));
    let status: Status = parse_record(&vectors["fixtures"]["status"]).unwrap();

    assert_eq!(status.link, "http://h.hatena.ne.jp/xxxx/XXXX");
    assert_eq!(status.created_at.to_rfc3339(), "2010-01-02T03:04:05+00:00");
    assert_eq!(status.favorited, 12);
    assert_eq!(status.html_mobile.as_deref(), Some("HTMLMobile"));
    assert_eq!(status.in_reply_to_user_id.as_deref(), Some("yyyy"));
    assert_eq!(status.source, "API");
    assert_eq!(status.user.screen_name, "xxxx");
    assert_eq!(status.target.as_ref().unwrap().word, "Word");

    let replies = status.replies.as_ref().unwrap();
    assert_eq!(replies.len(), 1);
    let reply = &replies[0];
    assert_eq!(reply.user.followers_count, 409);
    assert_eq!(reply.created_at.to_rfc3339(), "2009-06-07T08:09:10+00:00");
    assert_eq!(reply.keyword, None);
    assert_eq!(reply.in_reply_to_status_id, None);
}

#[test]
fn missing_field_vectors() {
    let vectors = load(include_str!("../../test-vectors/records.json"));

    for case in vectors["missing_field_cases"].as_array().unwrap() {
        let kind = parse_kind(case["kind"].as_str().unwrap());
        let removed = case["remove"].as_str().unwrap();
        let mut input = vectors["fixtures"][case["fixture"].as_str().unwrap()].clone();
        input.as_object_mut().unwrap().remove(removed);

        match build_record(kind, &input).unwrap_err() {
            ApiError::MissingField { record, field } => {
                assert_eq!(record, kind, "{removed}");
                assert_eq!(field, removed);
            }
            other => panic!("{removed}: expected MissingField, got {other}"),
        }
    }
}

#[test]
fn optional_field_vectors() {
    let vectors = load(include_str!("../../test-vectors/records.json"));

    for case in vectors["optional_field_cases"].as_array().unwrap() {
        let kind = parse_kind(case["kind"].as_str().unwrap());
        let removed = case["remove"].as_str().unwrap();
        let mut input = vectors["fixtures"][case["fixture"].as_str().unwrap()].clone();
        input.as_object_mut().unwrap().remove(removed);

        let record = build_record(kind, &input).unwrap();
        assert_eq!(record.kind(), kind);
        let absent = match (&record, removed) {
            (Record::Status(s), "replies") => s.replies.is_none(),
            (Record::Status(s), "target") => s.target.is_none(),
            (Record::Status(s), "haiku_text") => s.haiku_text.is_none(),
            (Record::Keyword(k), "related_keywords") => k.related_keywords.is_none(),
            (Record::Keyword(k), "url_name") => k.url_name.is_none(),
            (Record::Target(t), "url_name") => t.url_name.is_none(),
            (other, field) => panic!("no check for {field} on {other:?}"),
        };
        assert!(absent, "{removed} should be absent");
    }
}

/// Re-encoding each mapped scalar yields the text the server sent.
#[test]
fn mapped_scalars_reencode_to_wire_values() {
    let vectors = load(include_str!("../../test-vectors/records.json"));
    let fixtures = &vectors["fixtures"];
    let wire = |value: Param| String::from_utf8(encode_scalar(Some(&value)).unwrap().unwrap()).unwrap();

    let user: User = parse_record(&fixtures["user"]).unwrap();
    let user_json = &fixtures["user"];
    assert_eq!(wire(user.followers_count.into()), user_json["followers_count"]);
    assert_eq!(wire(user.id.into()), user_json["id"]);
    assert_eq!(wire(user.url.into()), user_json["url"]);

    let keyword: Keyword = parse_record(&fixtures["keyword"]).unwrap();
    let keyword_json = &fixtures["keyword"];
    assert_eq!(wire(keyword.entry_count.into()), keyword_json["entry_count"]);
    assert_eq!(wire(keyword.followers_count.into()), keyword_json["followers_count"]);
    let related: Param = keyword.related_keywords.unwrap().into_iter().collect();
    assert_eq!(wire(related), "word1,word2");

    let status: Status = parse_record(&fixtures["status"]).unwrap();
    assert_eq!(wire(status.favorited.into()), fixtures["status"]["favorited"]);
    // timestamps come back in the request date format, same instant
    assert_eq!(wire(status.created_at.into()), "Sat, 02 January 2010 03:04:05 GMT");
}
