//! Optional arguments shared by groups of endpoints.
//!
//! Every field is optional; unset fields are dropped from the request by
//! `encode_params` rather than sent empty.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::serialize::{join_comma, Param};

pub(crate) type ParamList = Vec<(&'static str, Option<Param>)>;

/// Options for the timeline endpoints (`public_timeline`, `user_timeline`,
/// `album`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    /// Extra body renderings to include, e.g. `haiku`, `html`, `html_touch`.
    pub body_formats: Option<Vec<String>>,
    pub count: Option<u32>,
    pub page: Option<u32>,
    /// Only entries newer than this instant.
    pub since: Option<DateTime<FixedOffset>>,
    pub sort: Option<String>,
    pub media: Option<String>,
}

impl TimelineOptions {
    pub(crate) fn params(&self) -> ParamList {
        vec![
            ("body_formats", body_formats(self.body_formats.as_deref())),
            ("count", self.count.map(Param::from)),
            ("page", self.page.map(Param::from)),
            ("since", self.since.map(Param::from)),
            ("sort", self.sort.clone().map(Param::from)),
            ("media", self.media.clone().map(Param::from)),
        ]
    }
}

/// Options for the keyword endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordOptions {
    pub without_related_keywords: Option<bool>,
}

impl KeywordOptions {
    pub(crate) fn params(&self) -> ParamList {
        vec![(
            "without_related_keywords",
            self.without_related_keywords.map(Param::from),
        )]
    }
}

/// A new entry for `statuses/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStatus {
    /// Keyword to post under, e.g. `id:alice` for a user's own page.
    pub keyword: String,
    pub status: String,
    pub in_reply_to_status_id: Option<String>,
    /// Client name shown next to the entry.
    pub source: Option<String>,
    /// Images to attach, sent as `file` parts.
    pub files: Vec<PathBuf>,
    pub body_formats: Option<Vec<String>>,
}

impl NewStatus {
    pub fn new(keyword: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub(crate) fn params(&self) -> ParamList {
        vec![
            ("keyword", Some(self.keyword.as_str().into())),
            ("status", Some(self.status.as_str().into())),
            (
                "in_reply_to_status_id",
                self.in_reply_to_status_id.clone().map(Param::from),
            ),
            ("source", self.source.clone().map(Param::from)),
            ("body_formats", body_formats(self.body_formats.as_deref())),
        ]
    }
}

pub(crate) fn body_formats(formats: Option<&[String]>) -> Option<Param> {
    join_comma(formats).map(Param::from)
}
