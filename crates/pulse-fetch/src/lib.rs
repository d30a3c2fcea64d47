//! Post sources for campaign-pulse: the X API v2 recent-search client and an
//! offline JSON file source.

pub mod client;
pub mod error;
pub mod file;
pub mod normalize;
pub(crate) mod retry;
pub mod source;
pub mod types;

pub use client::XClient;
pub use error::FetchError;
pub use file::FileSource;
pub use normalize::{normalize_page, UNKNOWN_AUTHOR};
pub use source::{PostSource, SearchRequest};
