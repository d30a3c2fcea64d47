//! Trending keywords (TF-IDF) and hashtag tallies.

use std::collections::HashMap;

use pulse_core::{PostTable, RankedTerm, TagCount};

use crate::error::AnalysisError;
use crate::tfidf::{tokenize, TfIdfVectorizer};

const KEYWORD_MIN_DF: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendReport {
    /// Descending by summed TF-IDF weight.
    pub keywords: Vec<RankedTerm>,
    /// Descending by count.
    pub hashtags: Vec<TagCount>,
}

/// Keywords and hashtags for the whole table.
///
/// A corpus too small or too sparse for keyword weighting yields an empty
/// keyword list; the hashtag tally is computed regardless.
#[must_use]
pub fn extract_trends(table: &PostTable, top_n: usize) -> TrendReport {
    let keywords = match top_keywords(table, top_n) {
        Ok(keywords) => keywords,
        Err(e) => {
            tracing::info!(error = %e, "no keywords extracted");
            Vec::new()
        }
    };
    let hashtags = top_hashtags(table, top_n);
    tracing::debug!(
        keywords = keywords.len(),
        hashtags = hashtags.len(),
        "trends extracted"
    );
    TrendReport { keywords, hashtags }
}

/// Top `top_n` unigrams and bigrams by corpus-summed TF-IDF weight.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientDocuments`] when fewer than two posts
/// carry any usable token, and [`AnalysisError::EmptyVocabulary`] when no
/// term appears in at least two posts.
pub fn top_keywords(table: &PostTable, top_n: usize) -> Result<Vec<RankedTerm>, AnalysisError> {
    let docs: Vec<&str> = table.iter().map(|p| p.cleaned_text.as_str()).collect();
    let usable = docs.iter().filter(|d| !tokenize(d).is_empty()).count();
    if usable < KEYWORD_MIN_DF {
        return Err(AnalysisError::InsufficientDocuments {
            context: "keyword extraction".to_string(),
            found: usable,
            required: KEYWORD_MIN_DF,
        });
    }

    let matrix = TfIdfVectorizer::new()
        .with_min_df(KEYWORD_MIN_DF)
        .with_max_features(top_n)
        .with_bigrams(true)
        .fit_transform(&docs)?;
    Ok(matrix.ranked_terms(top_n))
}

/// Top `top_n` hashtags by raw count; ties keep first-occurrence order.
#[must_use]
pub fn top_hashtags(table: &PostTable, top_n: usize) -> Vec<TagCount> {
    let mut tally: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for tag in table.iter().flat_map(|p| p.hashtags.iter()) {
        if let Some(&i) = index.get(tag.as_str()) {
            tally[i].count += 1;
        } else {
            index.insert(tag.as_str(), tally.len());
            tally.push(TagCount {
                tag: tag.clone(),
                count: 1,
            });
        }
    }
    // Stable sort keeps first-occurrence order among equal counts.
    tally.sort_by(|a, b| b.count.cmp(&a.count));
    tally.truncate(top_n);
    tally
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
    fn hashtags_tally_and_rank() {
        let t = table(&["#TVK rally #Vijay", "#tvk again", "#Vijay #TVK #chennai"]);
        let tags = top_hashtags(&t, 10);
        assert_eq!(tags[0], TagCount { tag: "tvk".into(), count: 3 });
        assert_eq!(tags[1], TagCount { tag: "vijay".into(), count: 2 });
        assert_eq!(tags[2], TagCount { tag: "chennai".into(), count: 1 });
    }

    #[test]
    fn hashtag_ties_keep_first_occurrence() {
        let t = table(&["#beta #alpha", "#gamma"]);
        let tags: Vec<_> = top_hashtags(&t, 10).into_iter().map(|t| t.tag).collect();
        assert_eq!(tags, ["beta", "alpha", "gamma"]);
    }

    #[test]
    fn hashtags_truncate_to_top_n() {
        let t = table(&["#a1 #b2 #c3 #d4"]);
        assert_eq!(top_hashtags(&t, 2).len(), 2);
    }

    #[test]
    fn keywords_need_two_documents() {
        let t = table(&["youth rally chennai"]);
        let err = top_keywords(&t, 20).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientDocuments { found: 1, required: 2, .. }
        ));
        let report = extract_trends(&t, 20);
        assert!(report.keywords.is_empty());
    }

    #[test]
    fn keywords_rank_shared_terms() {
        let t = table(&[
            "youth rally in chennai",
            "youth rally draws crowd",
            "chennai welcomes leader",
        ]);
        let keywords = top_keywords(&t, 20).unwrap();
        let terms: Vec<_> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert!(terms.contains(&"youth rally"));
        assert!(terms.contains(&"chennai"));
        assert!(!terms.contains(&"crowd"));
        for pair in keywords.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn collapsed_vocabulary_still_tallies_hashtags() {
        let t = table(&["alpha #TVK", "beta #Vijay"]);
        let report = extract_trends(&t, 20);
        assert!(report.keywords.is_empty());
        assert_eq!(report.hashtags.len(), 2);
        assert_eq!(report.hashtags[0], TagCount { tag: "tvk".into(), count: 1 });
    }

    #[test]
    fn extraction_is_idempotent() {
        let t = table(&[
            "youth rally in chennai #TVK",
            "youth rally draws crowd #TVK",
            "chennai welcomes leader #Vijay",
        ]);
        assert_eq!(extract_trends(&t, 20), extract_trends(&t, 20));
    }
}
