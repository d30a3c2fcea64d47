//! Strategy recommendations derived from a completed analysis.
//!
//! Rules contribute lines in a fixed order: sentiment, keywords, hashtags,
//! influencers, engagement, clusters. A rule whose input is absent is skipped.

use pulse_core::{AnalysisResult, SentimentLabel};

const MAJORITY: f64 = 0.5;
const PREVIEW: usize = 5;
const HIGH_ENGAGEMENT: f64 = 50.0;
const LOW_ENGAGEMENT: f64 = 10.0;

pub const POSITIVE_SENTIMENT: &str = "Strong positive sentiment! Continue current messaging strategy.";
pub const NEGATIVE_SENTIMENT: &str =
    "High negative sentiment detected. Consider messaging adjustments and addressing concerns.";
pub const NEUTRAL_SENTIMENT: &str = "Neutral sentiment. Opportunity to strengthen positive messaging.";
pub const KEYWORD_ADVICE: &str = "Consider incorporating these trending terms in campaign messaging.";
pub const HASHTAG_ADVICE: &str =
    "Monitor and engage with posts using these hashtags for maximum visibility.";
pub const INFLUENCER_ADVICE: &str =
    "Consider collaboration opportunities with these influential voices.";
pub const HIGH_ENGAGEMENT_NOTE: &str =
    "High engagement rate! Content is resonating well with audience.";
pub const LOW_ENGAGEMENT_NOTE: &str =
    "Lower engagement detected. Experiment with different content formats and timing.";
pub const CLUSTER_ADVICE: &str =
    "Create targeted messaging for each topic cluster to maximize relevance.";

/// Builds the recommendation lines for `result`.
///
/// `average_engagement` is the mean `likes + retweets` over the analyzed
/// posts, or `None` when there were none.
#[must_use]
pub fn generate_insights(result: &AnalysisResult, average_engagement: Option<f64>) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(counts) = &result.sentiment_counts {
        if let (Some(pos), Some(neg)) = (
            counts.ratio(SentimentLabel::Positive),
            counts.ratio(SentimentLabel::Negative),
        ) {
            let line = if pos > MAJORITY {
                POSITIVE_SENTIMENT
            } else if neg > MAJORITY {
                NEGATIVE_SENTIMENT
            } else {
                NEUTRAL_SENTIMENT
            };
            insights.push(line.to_string());
        }
    }

    if let Some(keywords) = result.top_keywords.as_deref().filter(|k| !k.is_empty()) {
        let preview: Vec<&str> = keywords.iter().take(PREVIEW).map(|k| k.term.as_str()).collect();
        insights.push(format!("Top trending keywords: {}", preview.join(", ")));
        insights.push(KEYWORD_ADVICE.to_string());
    }

    if let Some(tags) = result.top_hashtags.as_deref().filter(|t| !t.is_empty()) {
        let preview: Vec<&str> = tags.iter().take(PREVIEW).map(|t| t.tag.as_str()).collect();
        insights.push(format!("Top hashtags: {}", preview.join(", ")));
        insights.push(HASHTAG_ADVICE.to_string());
    }

    if let Some(influencers) = result.top_influencers.as_deref().filter(|i| !i.is_empty()) {
        let preview: Vec<&str> = influencers
            .iter()
            .take(PREVIEW)
            .map(|i| i.user.as_str())
            .collect();
        insights.push(format!("Key influencers: {}", preview.join(", ")));
        insights.push(INFLUENCER_ADVICE.to_string());
    }

    if let Some(avg) = average_engagement {
        insights.push(format!("Average engagement per post: {avg:.1} interactions"));
        if avg > HIGH_ENGAGEMENT {
            insights.push(HIGH_ENGAGEMENT_NOTE.to_string());
        } else if avg < LOW_ENGAGEMENT {
            insights.push(LOW_ENGAGEMENT_NOTE.to_string());
        }
    }

    if let Some(clusters) = &result.clusters {
        insights.push(format!(
            "Identified {} distinct topic clusters in discussions.",
            clusters.cluster_count()
        ));
        insights.push(CLUSTER_ADVICE.to_string());
    }

    insights
}
