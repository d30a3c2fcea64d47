use std::time::Duration;

use thiserror::Error;

use crate::types::AnalyzerKind;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no data: the post table is empty, nothing to analyze")]
    NoData,

    #[error("empty vocabulary for {context}: no term passed the document-frequency filter")]
    EmptyVocabulary { context: String },

    #[error("not enough usable documents for {context}: found {found}, need {required}")]
    InsufficientDocuments {
        context: String,
        found: usize,
        required: usize,
    },

    #[error("clustering failed: {0}")]
    Clustering(String),

    #[error("{analyzer} analyzer failed: {reason}")]
    Analyzer {
        analyzer: AnalyzerKind,
        reason: String,
    },

    #[error("{analyzer} analyzer exceeded its {limit:?} deadline")]
    Timeout {
        analyzer: AnalyzerKind,
        limit: Duration,
    },

    #[error("{analyzer} analyzer task was lost before completing")]
    AggregationIncomplete { analyzer: AnalyzerKind },
}
