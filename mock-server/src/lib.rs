//! In-memory Haiku API server used as a test fixture.
//!
//! Serves a seeded subset of the API under `/api` with the same loose wire
//! typing as the real service: counts and star totals are strings, and
//! timestamps use both the whole-second `Z` form and the fractional offset
//! form. Posting requires HTTP Basic credentials of a seeded user.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub followers_count: String,
    pub name: String,
    pub id: String,
    pub profile_image_url: String,
    pub screen_name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    pub title: String,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Status {
    pub link: String,
    pub created_at: String,
    pub favorited: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haiku_text: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_status_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_user_id: Option<String>,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Status>,
    pub source: String,
    pub target: Target,
    pub text: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Keyword {
    pub entry_count: String,
    pub followers_count: String,
    pub link: String,
    pub related_keywords: Vec<String>,
    pub title: String,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub keyword: String,
    pub status: String,
    pub in_reply_to_status_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Deserialize)]
pub struct TimelineQuery {
    pub word: Option<String>,
    pub count: Option<usize>,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    passwords: HashMap<String, String>,
    /// Newest first.
    statuses: Vec<Status>,
    keywords: Vec<Keyword>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

fn user(id: &str, followers: u32) -> User {
    User {
        followers_count: followers.to_string(),
        name: id.to_uppercase(),
        id: id.to_string(),
        profile_image_url: format!("http://www.st-hatena.com/users/{id}/profile.gif"),
        screen_name: id.to_string(),
        url: format!("http://h.hatena.ne.jp/{id}/"),
    }
}

fn keyword(word: &str, entries: u32, related: &[&str]) -> Keyword {
    Keyword {
        entry_count: entries.to_string(),
        followers_count: "2".to_string(),
        link: format!("http://h.hatena.ne.jp/keyword/{word}"),
        related_keywords: related.iter().map(|w| w.to_string()).collect(),
        title: word.to_string(),
        word: word.to_string(),
        url_name: None,
    }
}

impl Store {
    /// Two users (`alice`/`alice-pass`, `bob`/`bob-pass`), two keywords and
    /// one entry by bob.
    pub fn seeded() -> Self {
        let mut store = Store {
            next_id: 299864227873641485,
            ..Store::default()
        };
        for (id, followers) in [("alice", 3), ("bob", 7)] {
            store.users.insert(id.to_string(), user(id, followers));
            store.passwords.insert(id.to_string(), format!("{id}-pass"));
        }
        store.keywords = vec![keyword("haiku", 1, &["poem"]), keyword("poem", 0, &[])];
        store.post("bob", "haiku", "furu ike ya", None, "web", "2010-01-02T03:04:05Z".into());
        store
    }

    fn post(
        &mut self,
        author: &str,
        word: &str,
        text: &str,
        in_reply_to: Option<(String, String)>,
        source: &str,
        created_at: String,
    ) -> Status {
        let id = self.next_id.to_string();
        self.next_id += 1;
        let user = self.users[author].clone();
        let (in_reply_to_status_id, in_reply_to_user_id) = in_reply_to.unzip();
        let status = Status {
            link: format!("http://h.hatena.ne.jp/{author}/{id}"),
            created_at,
            favorited: "0".to_string(),
            haiku_text: Some(text.to_string()),
            id,
            in_reply_to_status_id,
            in_reply_to_user_id,
            keyword: word.to_string(),
            replies: Vec::new(),
            source: source.to_string(),
            target: Target {
                title: word.to_string(),
                word: word.to_string(),
                url_name: None,
            },
            text: format!("{word}={text}"),
            user,
        };
        if let Some(parent) = status
            .in_reply_to_status_id
            .as_deref()
            .and_then(|pid| self.statuses.iter_mut().find(|s| s.id == pid))
        {
            parent.replies.push(status.clone());
        }
        self.statuses.insert(0, status.clone());
        status
    }

    fn authenticate(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get("authorization")?.to_str().ok()?;
        let decoded = BASE64_STANDARD.decode(value.strip_prefix("Basic ")?).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (name, password) = decoded.split_once(':')?;
        (self.passwords.get(name)? == password).then(|| name.to_string())
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/statuses/public_timeline.json", get(public_timeline))
        .route("/api/statuses/keyword_timeline.json", get(keyword_timeline))
        .route("/api/statuses/update.json", post(update_status))
        .route("/api/statuses/show/{file}", get(show_status))
        .route("/api/favorites/create/{file}", post(add_star))
        .route("/api/friendships/show/{file}", get(show_user))
        .route("/api/statuses/followers/{file}", get(followers))
        .route("/api/keywords/show.json", get(show_keyword))
        .route("/api/keywords/hot.json", get(hot_keywords))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `alice.json` -> `alice`. Anything without the suffix is not a route.
fn strip_json(file: &str) -> Result<&str, StatusCode> {
    file.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)
}

async fn public_timeline(State(db): State<Db>, Query(q): Query<TimelineQuery>) -> Json<Vec<Status>> {
    let store = db.read().await;
    let count = q.count.unwrap_or(20);
    Json(store.statuses.iter().take(count).cloned().collect())
}

async fn keyword_timeline(
    State(db): State<Db>,
    Query(q): Query<TimelineQuery>,
) -> Result<Json<Vec<Status>>, StatusCode> {
    let word = q.word.ok_or(StatusCode::BAD_REQUEST)?;
    let store = db.read().await;
    let count = q.count.unwrap_or(20);
    Ok(Json(
        store
            .statuses
            .iter()
            .filter(|s| s.keyword == word)
            .take(count)
            .cloned()
            .collect(),
    ))
}

async fn update_status(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(input): Form<UpdateStatus>,
) -> Result<Json<Status>, StatusCode> {
    let mut store = db.write().await;
    let author = store.authenticate(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let in_reply_to = match input.in_reply_to_status_id {
        Some(pid) => {
            let parent = store
                .statuses
                .iter()
                .find(|s| s.id == pid)
                .ok_or(StatusCode::NOT_FOUND)?;
            Some((pid, parent.user.id.clone()))
        }
        None => None,
    };
    let created_at = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f+00:00")
        .to_string();
    let source = input.source.as_deref().unwrap_or("API");
    let status = store.post(&author, &input.keyword, &input.status, in_reply_to, source, created_at);
    debug!(id = %status.id, %author, "created status");
    Ok(Json(status))
}

async fn show_status(State(db): State<Db>, Path(file): Path<String>) -> Result<Json<Status>, StatusCode> {
    let eid = strip_json(&file)?;
    let store = db.read().await;
    store
        .statuses
        .iter()
        .find(|s| s.id == eid)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn add_star(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(file): Path<String>,
) -> Result<Json<Status>, StatusCode> {
    let eid = strip_json(&file)?;
    let mut store = db.write().await;
    store.authenticate(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let status = store
        .statuses
        .iter_mut()
        .find(|s| s.id == eid)
        .ok_or(StatusCode::NOT_FOUND)?;
    let stars: u64 = status.favorited.parse().unwrap_or(0);
    status.favorited = (stars + 1).to_string();
    Ok(Json(status.clone()))
}

async fn show_user(State(db): State<Db>, Path(file): Path<String>) -> Result<Json<User>, StatusCode> {
    let name = strip_json(&file)?;
    let store = db.read().await;
    store.users.get(name).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn followers(State(db): State<Db>, Path(file): Path<String>) -> Result<Json<Vec<User>>, StatusCode> {
    let name = strip_json(&file)?;
    let store = db.read().await;
    if !store.users.contains_key(name) {
        return Err(StatusCode::NOT_FOUND);
    }
    let mut users: Vec<User> = store.users.values().filter(|u| u.id != name).cloned().collect();
    users.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct KeywordQuery {
    pub word: Option<String>,
    pub without_related_keywords: Option<u8>,
}

fn render_keyword(keyword: &Keyword, without_related: bool) -> Keyword {
    let mut keyword = keyword.clone();
    if without_related {
        keyword.related_keywords.clear();
    }
    keyword
}

async fn show_keyword(State(db): State<Db>, Query(q): Query<KeywordQuery>) -> Result<Json<Keyword>, StatusCode> {
    let word = q.word.ok_or(StatusCode::BAD_REQUEST)?;
    let store = db.read().await;
    store
        .keywords
        .iter()
        .find(|k| k.word == word)
        .map(|k| Json(render_keyword(k, q.without_related_keywords == Some(1))))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn hot_keywords(State(db): State<Db>, Query(q): Query<KeywordQuery>) -> Json<Vec<Keyword>> {
    let store = db.read().await;
    let without_related = q.without_related_keywords == Some(1);
    Json(
        store
            .keywords
            .iter()
            .map(|k| render_keyword(k, without_related))
            .collect(),
    )
}
