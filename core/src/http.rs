//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values without ever
//! touching the network. Parameters stay as raw `(name, bytes)` pairs, the
//! output of `serialize::encode_params`, until a transport asks for the
//! percent-encoded query string or form body.

use std::path::PathBuf;

use url::form_urlencoded;

use crate::auth::OAuthCredentials;

/// HTTP method for a request. The Haiku API only reads with GET and
/// mutates with POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A file to upload as one part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub path: PathBuf,
}

/// An HTTP request described as plain data.
///
/// When `files` is non-empty the transport must send `form` and `files`
/// together as `multipart/form-data`; otherwise `form` is sent as
/// `application/x-www-form-urlencoded` (see `form_body`).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, Vec<u8>)>,
    pub form: Vec<(String, Vec<u8>)>,
    pub files: Vec<Attachment>,
    /// OAuth1 credentials the transport signs the request with.
    pub oauth: Option<OAuthCredentials>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            query: Vec::new(),
            form: Vec::new(),
            files: Vec::new(),
            oauth: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The full URL including the percent-encoded query string.
    pub fn url_with_query(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        format!("{}?{}", self.url, urlencode(&self.query))
    }

    /// The `application/x-www-form-urlencoded` body, if there is anything
    /// to send.
    pub fn form_body(&self) -> Option<String> {
        (!self.form.is_empty()).then(|| urlencode(&self.form))
    }
}

/// Percent-encode `(name, bytes)` pairs as `a=1&b=2`.
pub fn urlencode(pairs: &[(String, Vec<u8>)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                form_urlencoded::byte_serialize(k.as_bytes()).collect::<String>(),
                form_urlencoded::byte_serialize(v).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`, then
/// passed to `HaikuClient::parse_*` methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_percent_encoded() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://h/api/keywords/show.json".into());
        req.query = vec![
            ("word".to_string(), "はてな 俳句".as_bytes().to_vec()),
            ("since".to_string(), b"Sat, 01 January 2000 00:00:00 GMT".to_vec()),
        ];
        assert_eq!(
            req.url_with_query(),
            "http://h/api/keywords/show.json?word=%E3%81%AF%E3%81%A6%E3%81%AA+%E4%BF%B3%E5%8F%A5\
             &since=Sat%2C+01+January+2000+00%3A00%3A00+GMT"
        );
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let req = HttpRequest::new(HttpMethod::Get, "http://h/api/x.json".into());
        assert_eq!(req.url_with_query(), "http://h/api/x.json");
        assert!(req.form_body().is_none());
    }

    #[test]
    fn form_body_joins_pairs() {
        let mut req = HttpRequest::new(HttpMethod::Post, "http://h/api/x.json".into());
        req.form = vec![
            ("keyword".to_string(), b"id:alice".to_vec()),
            ("body_formats".to_string(), b"haiku,html".to_vec()),
        ];
        assert_eq!(
            req.form_body().as_deref(),
            Some("keyword=id%3Aalice&body_formats=haiku%2Chtml")
        );
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://h/".into());
        req.headers.push(("User-Agent".into(), "ua".into()));
        assert_eq!(req.header("user-agent"), Some("ua"));
        assert_eq!(req.header("authorization"), None);
    }
}
