//! Stateless HTTP request builder and response parser for the Haiku API.
//!
//! # Design
//! `HaikuClient` holds only configuration (API root, user agent,
//! credentials) and carries no mutable state between calls. Each endpoint
//! has a `build_*` method that produces an `HttpRequest`; responses are
//! handed to the `parse_*` method matching the record kind the endpoint
//! returns. The caller executes the HTTP round-trip in between, directly or
//! through a `Session`.
//!
//! Endpoint paths embed caller-supplied names and entry IDs, so every path
//! is checked before use and anything outside `[A-Za-z0-9./_-]`, or
//! containing `..` or `//`, is refused.

use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::{ApiError, Result};
use crate::http::{Attachment, HttpMethod, HttpRequest, HttpResponse};
use crate::mapper::{parse_list, parse_record, FromJson};
use crate::options::{body_formats, KeywordOptions, NewStatus, ParamList, TimelineOptions};
use crate::serialize::{encode_params, Param};
use crate::types::{Keyword, Status, User};

pub const DEFAULT_ROOT: &str = "http://h.hatena.ne.jp/api";
pub const DEFAULT_USER_AGENT: &str = concat!("haiku-core/", env!("CARGO_PKG_VERSION"));

/// Synchronous, stateless client for the Haiku API.
#[derive(Debug, Clone)]
pub struct HaikuClient {
    root: String,
    user_agent: String,
    credentials: Option<Credentials>,
}

impl Default for HaikuClient {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl HaikuClient {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    // -----------------------------------------------------------------------
    // Timelines
    // -----------------------------------------------------------------------

    pub fn build_public_timeline(&self, options: &TimelineOptions) -> Result<HttpRequest> {
        self.get("statuses/public_timeline.json", options.params())
    }

    pub fn build_keyword_timeline(&self, word: &str, options: &TimelineOptions) -> Result<HttpRequest> {
        let mut params = vec![("word", Some(word.into()))];
        params.extend(options.params());
        self.get("statuses/keyword_timeline.json", params)
    }

    /// Entries by `url_name`, or by the authenticated user when `None`.
    pub fn build_user_timeline(&self, url_name: Option<&str>, options: &TimelineOptions) -> Result<HttpRequest> {
        self.get(&owned_path("statuses/user_timeline", url_name), options.params())
    }

    pub fn build_friends_timeline(&self, url_name: Option<&str>, options: &TimelineOptions) -> Result<HttpRequest> {
        self.get(&owned_path("statuses/friends_timeline", url_name), options.params())
    }

    /// Entries with images, optionally restricted to one keyword.
    pub fn build_album(&self, word: Option<&str>, options: &TimelineOptions) -> Result<HttpRequest> {
        let mut params = options.params();
        params.push(("word", word.map(Param::from)));
        self.get("statuses/album.json", params)
    }

    // -----------------------------------------------------------------------
    // Entries and stars
    // -----------------------------------------------------------------------

    pub fn build_update_status(&self, status: &NewStatus) -> Result<HttpRequest> {
        let mut req = self.request(HttpMethod::Post, "statuses/update.json", Vec::new())?;
        req.form = encode(status.params())?;
        req.files = status
            .files
            .iter()
            .map(|path| Attachment {
                field: "file".to_string(),
                path: path.clone(),
            })
            .collect();
        Ok(req)
    }

    pub fn build_show_status(&self, eid: &str, formats: Option<&[String]>) -> Result<HttpRequest> {
        self.get(
            &format!("statuses/show/{eid}.json"),
            vec![("body_formats", body_formats(formats))],
        )
    }

    pub fn build_delete_status(
        &self,
        eid: &str,
        author_url_name: &str,
        formats: Option<&[String]>,
    ) -> Result<HttpRequest> {
        self.post(
            &format!("statuses/destroy/{eid}.json"),
            vec![
                ("author_url_name", Some(author_url_name.into())),
                ("body_formats", body_formats(formats)),
            ],
        )
    }

    pub fn build_add_star(&self, eid: &str, formats: Option<&[String]>) -> Result<HttpRequest> {
        self.post(
            &format!("favorites/create/{eid}.json"),
            vec![("body_formats", body_formats(formats))],
        )
    }

    pub fn build_remove_star(&self, eid: &str, formats: Option<&[String]>) -> Result<HttpRequest> {
        self.post(
            &format!("favorites/destroy/{eid}.json"),
            vec![("body_formats", body_formats(formats))],
        )
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn build_show_user(&self, url_name: Option<&str>) -> Result<HttpRequest> {
        self.get(&owned_path("friendships/show", url_name), Vec::new())
    }

    pub fn build_friends(&self, url_name: Option<&str>, page: Option<u32>) -> Result<HttpRequest> {
        self.get(
            &owned_path("statuses/friends", url_name),
            vec![("page", page.map(Param::from))],
        )
    }

    pub fn build_followers(&self, url_name: Option<&str>, page: Option<u32>) -> Result<HttpRequest> {
        self.get(
            &owned_path("statuses/followers", url_name),
            vec![("page", page.map(Param::from))],
        )
    }

    pub fn build_add_friend(&self, url_name: &str) -> Result<HttpRequest> {
        self.post(&format!("friendships/create/{url_name}.json"), Vec::new())
    }

    pub fn build_remove_friend(&self, url_name: &str) -> Result<HttpRequest> {
        self.post(&format!("friendships/destroy/{url_name}.json"), Vec::new())
    }

    // -----------------------------------------------------------------------
    // Keywords
    // -----------------------------------------------------------------------

    pub fn build_show_keyword(&self, word: &str, options: &KeywordOptions) -> Result<HttpRequest> {
        let mut params = vec![("word", Some(word.into()))];
        params.extend(options.params());
        self.get("keywords/show.json", params)
    }

    pub fn build_hot_keywords(&self, options: &KeywordOptions) -> Result<HttpRequest> {
        self.get("keywords/hot.json", options.params())
    }

    pub fn build_keyword_list(
        &self,
        page: Option<u32>,
        word: Option<&str>,
        options: &KeywordOptions,
    ) -> Result<HttpRequest> {
        let mut params = vec![("page", page.map(Param::from)), ("word", word.map(Param::from))];
        params.extend(options.params());
        self.get("keywords/list.json", params)
    }

    pub fn build_associate_keywords(&self, word1: &str, word2: &str, options: &KeywordOptions) -> Result<HttpRequest> {
        self.post("keywords/relation/create.json", keyword_pair(word1, word2, options))
    }

    pub fn build_dissociate_keywords(&self, word1: &str, word2: &str, options: &KeywordOptions) -> Result<HttpRequest> {
        self.post("keywords/relation/destroy.json", keyword_pair(word1, word2, options))
    }

    /// Keywords followed by `url_name`, or by the authenticated user.
    pub fn build_favorite_keywords(
        &self,
        url_name: Option<&str>,
        page: Option<u32>,
        options: &KeywordOptions,
    ) -> Result<HttpRequest> {
        let mut params = vec![("page", page.map(Param::from))];
        params.extend(options.params());
        self.get(&owned_path("statuses/keywords", url_name), params)
    }

    pub fn build_add_favorite_keyword(&self, word: &str, options: &KeywordOptions) -> Result<HttpRequest> {
        let mut params = vec![("word", Some(word.into()))];
        params.extend(options.params());
        self.post("keywords/create.json", params)
    }

    pub fn build_remove_favorite_keyword(&self, word: &str, options: &KeywordOptions) -> Result<HttpRequest> {
        let mut params = vec![("word", Some(word.into()))];
        params.extend(options.params());
        self.post("keywords/destroy.json", params)
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    pub fn parse_status(&self, response: HttpResponse) -> Result<Status> {
        self.parse_one(response)
    }

    pub fn parse_statuses(&self, response: HttpResponse) -> Result<Vec<Status>> {
        self.parse_many(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User> {
        self.parse_one(response)
    }

    pub fn parse_users(&self, response: HttpResponse) -> Result<Vec<User>> {
        self.parse_many(response)
    }

    pub fn parse_keyword(&self, response: HttpResponse) -> Result<Keyword> {
        self.parse_one(response)
    }

    pub fn parse_keywords(&self, response: HttpResponse) -> Result<Vec<Keyword>> {
        self.parse_many(response)
    }

    fn parse_one<T: FromJson>(&self, response: HttpResponse) -> Result<T> {
        let body = decode_json(response)?;
        let record = parse_record(&body)?;
        debug!(kind = ?T::KIND, "parsed record");
        Ok(record)
    }

    fn parse_many<T: FromJson>(&self, response: HttpResponse) -> Result<Vec<T>> {
        let body = decode_json(response)?;
        let records = parse_list::<T>(&body)?;
        debug!(kind = ?T::KIND, count = records.len(), "parsed records");
        Ok(records)
    }

    // -----------------------------------------------------------------------
    // Request assembly
    // -----------------------------------------------------------------------

    fn get(&self, path: &str, params: ParamList) -> Result<HttpRequest> {
        self.request(HttpMethod::Get, path, params)
    }

    /// POST with the parameters in the query string, as every mutating
    /// endpoint except `statuses/update` expects.
    fn post(&self, path: &str, params: ParamList) -> Result<HttpRequest> {
        self.request(HttpMethod::Post, path, params)
    }

    pub(crate) fn request(&self, method: HttpMethod, path: &str, query: ParamList) -> Result<HttpRequest> {
        check_path(path)?;
        let url = format!("{}/{}", self.root, path.trim_start_matches('/'));
        let mut req = HttpRequest::new(method, url);
        req.headers
            .push(("User-Agent".to_string(), self.user_agent.clone()));
        if let Some(credentials) = &self.credentials {
            credentials.apply(&mut req);
        }
        req.query = encode(query)?;
        debug!(method = method.as_str(), url = %req.url, params = req.query.len(), "built request");
        Ok(req)
    }
}

pub(crate) fn encode(params: ParamList) -> Result<Vec<(String, Vec<u8>)>> {
    Ok(encode_params(Some(params))?.unwrap_or_default())
}

fn owned_path(base: &str, url_name: Option<&str>) -> String {
    match url_name {
        Some(name) => format!("{base}/{name}.json"),
        None => format!("{base}.json"),
    }
}

fn keyword_pair(word1: &str, word2: &str, options: &KeywordOptions) -> ParamList {
    let mut params = vec![("word1", Some(word1.into())), ("word2", Some(word2.into()))];
    params.extend(options.params());
    params
}

fn check_path(path: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '-' | '_');
    if !path.chars().all(allowed) || path.contains("..") || path.contains("//") {
        return Err(ApiError::SuspiciousPath(path.to_string()));
    }
    Ok(())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

fn decode_json(response: HttpResponse) -> Result<Value> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
