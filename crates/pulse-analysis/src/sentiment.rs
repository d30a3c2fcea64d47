//! Per-post sentiment classification and tallying.

use pulse_core::{PostSentiment, PostTable, SentimentCounts, SentimentLabel};

use crate::scorer::compound_score;

/// Compound scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Sentiment over a whole post table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentReport {
    pub counts: SentimentCounts,
    /// One entry per post, in table order.
    pub posts: Vec<PostSentiment>,
    /// Mean compound score; `0.0` for an empty table.
    pub average_compound: f64,
}

/// Buckets a compound score. Scores at exactly ±0.05 are neutral.
#[must_use]
pub fn classify(compound: f64) -> SentimentLabel {
    if compound > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if compound < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Scores every post's cleaned text.
///
/// A post whose text yields no usable score (empty, or no lexicon hits)
/// counts as neutral; one bad row never fails the batch.
#[must_use]
pub fn analyze_sentiment(table: &PostTable) -> SentimentReport {
    tracing::debug!(posts = table.len(), "scoring sentiment");

    let mut report = SentimentReport {
        posts: Vec::with_capacity(table.len()),
        ..SentimentReport::default()
    };
    let mut total = 0.0_f64;

    for post in table {
        let compound = compound_score(&post.cleaned_text);
        let label = classify(compound);
        report.counts.record(label);
        total += compound;
        report.posts.push(PostSentiment {
            post_id: post.id.clone(),
            label,
            compound,
        });
    }

    if !report.posts.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let denom = report.posts.len() as f64;
        report.average_compound = total / denom;
    }

    tracing::debug!(
        positive = report.counts.positive,
        negative = report.counts.negative,
        neutral = report.counts.neutral,
        "sentiment scored"
    );
    report
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pulse_core::RawPost;

    use super::*;

    fn table(texts: &[&str]) -> PostTable {
        let raw = texts
            .iter()
            .enumerate()
            .map(|(i, text)| RawPost {
                id: format!("p{i}"),
                text: (*text).to_string(),
                author: format!("user{i}"),
                author_followers: 0,
                likes: 0,
                retweets: 0,
                replies: 0,
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                location: None,
            })
            .collect();
        PostTable::from_raw(raw)
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify(0.05), SentimentLabel::Neutral);
        assert_eq!(classify(-0.05), SentimentLabel::Neutral);
        assert_eq!(classify(0.050_001), SentimentLabel::Positive);
        assert_eq!(classify(-0.050_001), SentimentLabel::Negative);
        assert_eq!(classify(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn counts_sum_to_post_count() {
        let t = table(&[
            "Great rally today! #TVK",
            "Terrible event #TVK",
            "It was okay #TVK",
            "",
            "https://t.co/only-a-link",
        ]);
        let report = analyze_sentiment(&t);
        assert_eq!(report.counts.total(), t.len());
        assert_eq!(report.posts.len(), t.len());
        assert_eq!(report.counts.positive, 1);
        assert_eq!(report.counts.negative, 1);
        assert_eq!(report.counts.neutral, 3);
    }

    #[test]
    fn per_post_rows_follow_table_order() {
        let t = table(&["love this", "hate this"]);
        let report = analyze_sentiment(&t);
        assert_eq!(report.posts[0].post_id, "p0");
        assert_eq!(report.posts[0].label, SentimentLabel::Positive);
        assert_eq!(report.posts[1].label, SentimentLabel::Negative);
    }

    #[test]
    fn empty_table_averages_to_zero() {
        let report = analyze_sentiment(&PostTable::default());
        assert_eq!(report.counts.total(), 0);
        assert!(report.average_compound.abs() < f64::EPSILON);
    }
}
