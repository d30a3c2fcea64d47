//! Post records and the immutable post table shared by every analyzer.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::{clean_text, extract_hashtags, extract_mentions};

/// A post as delivered by a fetch source, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub author_followers: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A normalized post. Immutable once built: derived fields are computed once
/// in [`Post::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author: String,
    pub author_followers: u64,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    /// `likes + retweets`.
    pub engagement: u64,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub location: Option<String>,
    pub cleaned_text: String,
}

impl Post {
    #[must_use]
    pub fn from_raw(raw: RawPost) -> Self {
        let cleaned_text = clean_text(&raw.text);
        let hashtags = extract_hashtags(&raw.text);
        let mentions = extract_mentions(&raw.text);
        let location = raw.location.filter(|l| !l.trim().is_empty());
        Self {
            engagement: raw.likes.saturating_add(raw.retweets),
            id: raw.id,
            text: raw.text,
            author: raw.author,
            author_followers: raw.author_followers,
            likes: raw.likes,
            retweets: raw.retweets,
            replies: raw.replies,
            timestamp: raw.timestamp,
            hashtags,
            mentions,
            location,
            cleaned_text,
        }
    }
}

/// The working set of posts for one run.
///
/// Rows are shared behind an `Arc<[Post]>`: cloning a table is cheap and no
/// holder can mutate the rows.
#[derive(Debug, Clone, Default)]
pub struct PostTable {
    rows: Arc<[Post]>,
}

impl PostTable {
    /// Builds a table, dropping rows without an `id` or `author` and keeping
    /// only the first row for each `id`.
    #[must_use]
    pub fn new(posts: Vec<Post>) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(posts.len());
        let mut rows = Vec::with_capacity(posts.len());
        for post in posts {
            if post.id.trim().is_empty() || post.author.trim().is_empty() {
                tracing::warn!(id = %post.id, "dropping post without id or author");
                continue;
            }
            if !seen.insert(post.id.clone()) {
                tracing::debug!(id = %post.id, "dropping duplicate post");
                continue;
            }
            rows.push(post);
        }
        Self { rows: rows.into() }
    }

    /// Normalizes and builds a table in one step.
    #[must_use]
    pub fn from_raw(raw: Vec<RawPost>) -> Self {
        Self::new(raw.into_iter().map(Post::from_raw).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.rows.iter()
    }

    /// Number of distinct authors.
    #[must_use]
    pub fn unique_authors(&self) -> usize {
        self.rows
            .iter()
            .map(|p| p.author.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Mean of `engagement` across rows, or `None` for an empty table.
    #[must_use]
    pub fn average_engagement(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let total = self.rows.iter().map(|p| p.engagement as f64).sum::<f64>();
        #[allow(clippy::cast_precision_loss)]
        let denom = self.rows.len() as f64;
        Some(total / denom)
    }

    /// Earliest and latest timestamps in the table.
    #[must_use]
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let min = self.rows.iter().map(|p| p.timestamp).min()?;
        let max = self.rows.iter().map(|p| p.timestamp).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a PostTable {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Serializes timestamps as `%Y-%m-%d %H:%M:%S` (UTC).
pub mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn raw(id: &str, author: &str, text: &str) -> RawPost {
        RawPost {
            id: id.to_string(),
            text: text.to_string(),
            author: author.to_string(),
            author_followers: 120,
            likes: 7,
            retweets: 3,
            replies: 1,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 10, 30, 0).unwrap(),
            location: None,
        }
    }

    #[test]
    fn from_raw_derives_fields_once() {
        let post = Post::from_raw(raw("1", "alice", "Huge crowd @Bob #TVK https://t.co/x"));
        assert_eq!(post.engagement, 10);
        assert_eq!(post.hashtags, vec!["tvk"]);
        assert_eq!(post.mentions, vec!["bob"]);
        assert_eq!(post.cleaned_text, "Huge crowd Bob TVK");
    }

    #[test]
    fn blank_location_becomes_none() {
        let mut r = raw("1", "alice", "hi");
        r.location = Some("  ".to_string());
        assert!(Post::from_raw(r).location.is_none());
    }

    #[test]
    fn table_dedups_by_id_keeping_first() {
        let table = PostTable::from_raw(vec![
            raw("1", "alice", "first"),
            raw("1", "bob", "second"),
            raw("2", "carol", "third"),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.posts()[0].author, "alice");
    }

    #[test]
    fn table_drops_rows_without_id_or_author() {
        let table = PostTable::from_raw(vec![raw("", "alice", "x"), raw("2", " ", "y")]);
        assert!(table.is_empty());
    }

    #[test]
    fn average_engagement_and_authors() {
        let mut second = raw("2", "alice", "b");
        second.likes = 20;
        second.retweets = 0;
        let table = PostTable::from_raw(vec![raw("1", "alice", "a"), second]);
        assert_eq!(table.unique_authors(), 1);
        assert!((table.average_engagement().unwrap() - 15.0).abs() < f64::EPSILON);
        assert!(PostTable::default().average_engagement().is_none());
    }

    #[test]
    fn timestamp_serializes_in_fixed_format() {
        let post = Post::from_raw(raw("1", "alice", "x"));
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["timestamp"], "2026-01-05 10:30:00");
    }

    #[test]
    fn raw_post_defaults_optional_fields() {
        let json = r#"{"id":"9","author":"dave","timestamp":"2026-02-01T08:00:00Z"}"#;
        let raw: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(raw.text, "");
        assert_eq!(raw.likes, 0);
        assert!(raw.location.is_none());
    }
}
