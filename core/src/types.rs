//! Typed records decoded from Haiku API responses.
//!
//! # Design
//! Records are plain owned values built once by the mapper (`crate::mapper`)
//! and never mutated afterwards. Optional wire fields are `Option`s so an
//! absent field is never confused with an empty string or zero. Every
//! identifier is kept as a `String` regardless of how the server typed it.

use chrono::{DateTime, FixedOffset};

/// Selects which record schema the mapper applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Status,
    User,
    Keyword,
    Target,
}

/// A single entry (post) on a keyword or user timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub link: String,
    pub created_at: DateTime<FixedOffset>,
    /// Number of stars the entry has received.
    pub favorited: i64,
    pub haiku_text: Option<String>,
    pub html: Option<String>,
    pub html_touch: Option<String>,
    pub html_mobile: Option<String>,
    pub id: String,
    pub in_reply_to_status_id: Option<String>,
    pub in_reply_to_user_id: Option<String>,
    pub keyword: Option<String>,
    /// Replies nested under this entry, oldest first as sent by the server.
    pub replies: Option<Vec<Status>>,
    pub source: String,
    pub target: Option<Target>,
    pub text: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub followers_count: i64,
    pub name: String,
    pub id: String,
    pub profile_image_url: String,
    pub screen_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub entry_count: i64,
    pub followers_count: i64,
    pub link: String,
    pub related_keywords: Option<Vec<String>>,
    pub title: String,
    pub word: String,
    pub url_name: Option<String>,
}

/// The keyword or user an entry was posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub title: String,
    pub word: String,
    pub url_name: Option<String>,
}

/// A record of any kind, as returned by `mapper::build_record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Status(Status),
    User(User),
    Keyword(Keyword),
    Target(Target),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Status(_) => RecordKind::Status,
            Record::User(_) => RecordKind::User,
            Record::Keyword(_) => RecordKind::Keyword,
            Record::Target(_) => RecordKind::Target,
        }
    }
}

impl From<Status> for Record {
    fn from(value: Status) -> Self {
        Record::Status(value)
    }
}

impl From<User> for Record {
    fn from(value: User) -> Self {
        Record::User(value)
    }
}

impl From<Keyword> for Record {
    fn from(value: Keyword) -> Self {
        Record::Keyword(value)
    }
}

impl From<Target> for Record {
    fn from(value: Target) -> Self {
        Record::Target(value)
    }
}
