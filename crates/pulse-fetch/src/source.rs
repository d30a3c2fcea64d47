use std::future::Future;

use chrono::{Days, NaiveDate};
use pulse_core::RawPost;

use crate::error::FetchError;

/// What to fetch: a query, how many posts, and how far back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub count: usize,
    /// Only posts on or after this date (UTC).
    pub since: Option<NaiveDate>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, count: usize) -> Self {
        Self {
            query: query.into(),
            count,
            since: None,
        }
    }

    #[must_use]
    pub fn with_since(mut self, since: NaiveDate) -> Self {
        self.since = Some(since);
        self
    }

    /// Sets `since` to `today - days`.
    #[must_use]
    pub fn with_lookback(self, today: NaiveDate, days: u32) -> Self {
        match today.checked_sub_days(Days::new(u64::from(days))) {
            Some(since) => self.with_since(since),
            None => self,
        }
    }
}

/// A supplier of posts for a query.
///
/// "No matching posts" is `Ok(vec![])`; every `Err` means the source could
/// not be used and the pipeline should halt.
pub trait PostSource: Send + Sync {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<RawPost>, FetchError>> + Send;
}
