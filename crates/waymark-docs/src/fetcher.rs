//! Docs page fetching with an in-memory cache of processed pages.
//!
//! `ContentSource` abstracts where raw HTML comes from so the cache and
//! post-processing run identically against the real site and against the
//! in-memory fake in tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use waymark_core::ContentKey;

use crate::rewrite::process_page;

#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("invalid docs URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("docs request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("docs page '{url}' returned status {status}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no docs content for '{0}'")]
    NotFound(String),
}

/// Trait abstracting raw docs retrieval.
///
/// Implemented by:
/// - `HttpContentSource` - real HTTP fetches
/// - `FakeContentSource` - in-memory pages for testing
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw HTML of one page.
    async fn fetch(&self, url: &Url) -> Result<String, DocsError>;
}

/// Real docs source backed by reqwest.
pub struct HttpContentSource {
    client: reqwest::Client,
}

impl HttpContentSource {
    pub fn new() -> Result<Self, DocsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, url: &Url) -> Result<String, DocsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, %url, "docs fetch failed");
            return Err(DocsError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// In-memory docs source for testing.
pub struct FakeContentSource {
    pages: RwLock<HashMap<String, String>>,
}

impl FakeContentSource {
    pub fn new() -> Self {
        info!("[FakeContentSource] creating new fake source");
        Self {
            pages: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert_page(&self, url: impl Into<String>, html: impl Into<String>) {
        let mut pages = self.pages.write().await;
        pages.insert(url.into(), html.into());
    }
}

impl Default for FakeContentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSource for FakeContentSource {
    async fn fetch(&self, url: &Url) -> Result<String, DocsError> {
        let pages = self.pages.read().await;
        pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| DocsError::NotFound(url.to_string()))
    }
}

/// Fetches docs pages, post-processes them, and caches the result by URL.
///
/// The page key for section markers derives from the URL path through
/// `ContentKey`, so one page's persisted section state never collides
/// with another's.
pub struct DocsFetcher {
    source: Arc<dyn ContentSource>,
    cache: RwLock<HashMap<String, Arc<String>>>,
}

impl DocsFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Storage key for a page's interactive-section state.
    pub fn page_key(url: &Url) -> ContentKey {
        ContentKey::new(url.path().trim_matches('/'))
    }

    /// Fetch and post-process a page, serving repeats from the cache.
    pub async fn get_page(&self, url: &str) -> Result<Arc<String>, DocsError> {
        {
            let cache = self.cache.read().await;
            if let Some(page) = cache.get(url) {
                debug!(%url, "docs cache hit");
                return Ok(Arc::clone(page));
            }
        }

        let parsed = Url::parse(url).map_err(|source| DocsError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let raw = self.source.fetch(&parsed).await?;
        let processed = Arc::new(process_page(&raw, &parsed, &Self::page_key(&parsed)));
        debug!(%url, bytes = processed.len(), "docs page processed");

        let mut cache = self.cache.write().await;
        // A racing fetch may have filled the slot; first write wins.
        Ok(Arc::clone(
            cache.entry(url.to_string()).or_insert(processed),
        ))
    }

    /// Drop all cached pages.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
    }
}
