//! The aggregate analysis result handed to report and visualization consumers.
//!
//! Field names are part of the consumer contract: `sentiment`, `top_keywords`,
//! `top_hashtags`, `clusters`, `top_influencers`, `strategy_insights`. A field
//! is `None` when its analyzer failed or timed out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post counts per sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    #[must_use]
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of posts carrying `label`, or `None` when nothing was counted.
    #[must_use]
    pub fn ratio(&self, label: SentimentLabel) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.get(label) as f64 / total as f64;
        Some(ratio)
    }
}

/// Per-post sentiment, kept for downstream analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSentiment {
    pub post_id: String,
    pub label: SentimentLabel,
    pub compound: f64,
}

/// A keyword and its corpus-summed TF-IDF weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTerm {
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Topic clusters over the post table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster id per post, in post-table order.
    pub assignments: Vec<usize>,
    pub cluster_counts: BTreeMap<usize, usize>,
    pub cluster_terms: BTreeMap<usize, Vec<String>>,
    pub requested_k: usize,
    pub effective_k: usize,
}

impl ClusterSummary {
    /// Number of clusters that received at least one post.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_terms.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    pub user: String,
    /// Degree centrality.
    pub centrality: f64,
    /// Betweenness centrality; absent when it could not be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub betweenness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "sentiment", default, skip_serializing_if = "Option::is_none")]
    pub sentiment_counts: Option<SentimentCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_sentiments: Option<Vec<PostSentiment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_compound: Option<f64>,
    /// Descending by score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_keywords: Option<Vec<RankedTerm>>,
    /// Descending by count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_hashtags: Option<Vec<TagCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<ClusterSummary>,
    /// Descending by degree centrality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_influencers: Option<Vec<Influencer>>,
    #[serde(default)]
    pub strategy_insights: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_record_and_ratio() {
        let mut counts = SentimentCounts::default();
        counts.record(SentimentLabel::Positive);
        counts.record(SentimentLabel::Positive);
        counts.record(SentimentLabel::Neutral);
        counts.record(SentimentLabel::Negative);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.get(SentimentLabel::Positive), 2);
        assert!((counts.ratio(SentimentLabel::Positive).unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_of_empty_counts_is_none() {
        assert!(SentimentCounts::default()
            .ratio(SentimentLabel::Negative)
            .is_none());
    }

    #[test]
    fn result_serializes_consumer_field_names() {
        let result = AnalysisResult {
            sentiment_counts: Some(SentimentCounts {
                positive: 1,
                negative: 0,
                neutral: 2,
            }),
            top_hashtags: Some(vec![TagCount {
                tag: "tvk".to_string(),
                count: 3,
            }]),
            ..AnalysisResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"]["neutral"], 2);
        assert_eq!(json["top_hashtags"][0]["tag"], "tvk");
        assert!(json.get("clusters").is_none());
        assert_eq!(json["strategy_insights"], serde_json::json!([]));
    }

    #[test]
    fn label_display_is_lowercase() {
        assert_eq!(SentimentLabel::Negative.to_string(), "negative");
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Positive).unwrap(),
            "\"positive\""
        );
    }
}
