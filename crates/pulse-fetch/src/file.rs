//! Offline post source backed by a JSON file of [`RawPost`] records.

use std::path::{Path, PathBuf};

use pulse_core::RawPost;

use crate::error::FetchError;
use crate::source::{PostSource, SearchRequest};

/// Reads posts from a JSON array on disk.
///
/// The query string is not matched against post text; the file is assumed to
/// already hold the posts for the query. `since` and `count` are applied.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record in the file.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] if the file cannot be read, or
    /// [`FetchError::Deserialize`] if it is not a JSON array of posts.
    pub async fn load(&self) -> Result<Vec<RawPost>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Deserialize {
            context: self.path.display().to_string(),
            source,
        })
    }
}

impl PostSource for FileSource {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawPost>, FetchError> {
        let mut posts = self.load().await?;
        if let Some(since) = request.since {
            posts.retain(|p| p.timestamp.date_naive() >= since);
        }
        posts.truncate(request.count);
        tracing::info!(
            path = %self.path.display(),
            posts = posts.len(),
            "loaded posts from file"
        );
        Ok(posts)
    }
}
