//! Conversion of X API search pages into [`RawPost`] records.

use std::collections::HashMap;

use pulse_core::RawPost;

use crate::types::{SearchResponse, User};

/// Author name used when a tweet's author was not included in the response.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Joins each tweet with its expanded author.
///
/// Tweets without `created_at` are skipped with a warning. A tweet whose
/// author is missing from `includes.users` gets [`UNKNOWN_AUTHOR`] and zero
/// followers.
#[must_use]
pub fn normalize_page(page: SearchResponse) -> Vec<RawPost> {
    let users: HashMap<&str, &User> = page
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u))
        .collect();

    page.data
        .iter()
        .filter_map(|tweet| {
            let Some(timestamp) = tweet.created_at else {
                tracing::warn!(tweet_id = %tweet.id, "tweet without created_at, skipping");
                return None;
            };
            let user = tweet
                .author_id
                .as_deref()
                .and_then(|id| users.get(id).copied());

            Some(RawPost {
                id: tweet.id.clone(),
                text: tweet.text.clone(),
                author: user.map_or_else(|| UNKNOWN_AUTHOR.to_string(), |u| u.username.clone()),
                author_followers: user.map_or(0, |u| u.public_metrics.followers_count),
                likes: tweet.public_metrics.like_count,
                retweets: tweet.public_metrics.retweet_count,
                replies: tweet.public_metrics.reply_count,
                timestamp,
                location: user
                    .and_then(|u| u.location.clone())
                    .filter(|l| !l.trim().is_empty()),
            })
        })
        .collect()
}
