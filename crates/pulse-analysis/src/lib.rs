//! Analysis pipeline for campaign-pulse.
//!
//! Four independent analyzers (sentiment, trends, topic clusters, influence)
//! run concurrently over one immutable [`pulse_core::PostTable`]. The
//! [`Orchestrator`] joins them, merges their outputs into an
//! [`pulse_core::AnalysisResult`] and derives strategy insights from it.

pub mod cluster;
pub mod error;
pub mod influence;
pub mod insights;
pub mod orchestrator;
pub mod scorer;
pub mod sentiment;
pub mod tfidf;
pub mod trends;
pub mod types;

mod stopwords;

pub use cluster::cluster_topics;
pub use error::AnalysisError;
pub use influence::{map_influence, GraphExport, InfluenceGraph, InfluenceReport};
pub use insights::generate_insights;
pub use orchestrator::{Analyzers, DefaultAnalyzers, Orchestrator};
pub use scorer::compound_score;
pub use sentiment::{analyze_sentiment, classify, SentimentReport};
pub use trends::{extract_trends, TrendReport};
pub use types::{AnalysisConfig, AnalysisRun, AnalyzerFailure, AnalyzerKind, RunState};
