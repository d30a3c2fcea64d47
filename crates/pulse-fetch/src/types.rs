//! X API v2 recent-search response types.
//!
//! Only the fields requested through `tweet.fields`, `user.fields` and the
//! `author_id` expansion are modelled. Everything optional defaults so a
//! sparse response still parses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /2/tweets/search/recent` response body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    /// Absent when the query matched nothing.
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
    #[serde(default)]
    pub meta: SearchMeta,
}

#[derive(Debug, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: TweetMetrics,
}

#[derive(Debug, Default, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// Objects pulled in by `expansions=author_id`.
#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub public_metrics: UserMetrics,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub result_count: u64,
    #[serde(default)]
    pub next_token: Option<String>,
}
