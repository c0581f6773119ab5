//! Guide persistence trait and the real HTTP implementation.
//!
//! `GuideStore` abstracts guide persistence so the same wiring runs
//! against the real backend (`HttpGuideStore`) and against the in-memory
//! `FakeGuideStore` in tests.
//!
//! The backend rolls out incrementally: several status codes mean "this
//! endpoint is not available here yet" rather than a real failure. Those
//! are downgraded to empty results with a `warn!`, never surfaced as
//! errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use waymark_api::Guide;

use crate::error::BackendError;
use crate::resource::{GuideResource, API_VERSION};

/// Statuses meaning "feature not yet available" on this backend.
const NOT_AVAILABLE_STATUSES: [StatusCode; 6] = [
    StatusCode::BAD_REQUEST,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::METHOD_NOT_ALLOWED,
    StatusCode::NOT_IMPLEMENTED,
    StatusCode::SERVICE_UNAVAILABLE,
];

fn is_not_available(status: StatusCode) -> bool {
    NOT_AVAILABLE_STATUSES.contains(&status)
}

/// Trait abstracting guide persistence.
///
/// Implemented by:
/// - `HttpGuideStore` - real REST client for production
/// - `FakeGuideStore` - in-memory store for testing
#[async_trait]
pub trait GuideStore: Send + Sync {
    /// List all guide resources in the store's namespace.
    ///
    /// An unavailable backend yields an empty list, not an error.
    async fn list_guides(&self) -> Result<Vec<GuideResource>, BackendError>;

    /// Fetch one guide resource by name.
    ///
    /// `None` covers both "does not exist" and "backend unavailable".
    async fn get_guide(&self, name: &str) -> Result<Option<GuideResource>, BackendError>;

    /// Save a guide, creating or updating its resource.
    ///
    /// Returns the stored resource, or `None` when the backend is
    /// unavailable (the save is dropped, not retried).
    async fn save_guide(&self, guide: &Guide) -> Result<Option<GuideResource>, BackendError>;

    /// Delete a guide resource by name. Missing resources and
    /// unavailable backends are both no-ops.
    async fn delete_guide(&self, name: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    items: Vec<GuideResource>,
}

/// REST client storing guides as namespaced custom resources.
pub struct HttpGuideStore {
    client: reqwest::Client,
    base: Url,
    namespace: String,
}

impl HttpGuideStore {
    /// Build a client for the collection under `base_url` and `namespace`.
    pub fn new(base_url: &str, namespace: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
            namespace: namespace.into(),
        })
    }

    fn collection_url(&self) -> Result<Url, BackendError> {
        let path = format!(
            "apis/{API_VERSION}/namespaces/{}/interactiveguides",
            self.namespace
        );
        Ok(self.base.join(&path)?)
    }

    fn resource_url(&self, name: &str) -> Result<Url, BackendError> {
        let path = format!(
            "apis/{API_VERSION}/namespaces/{}/interactiveguides/{name}",
            self.namespace
        );
        Ok(self.base.join(&path)?)
    }
}

#[async_trait]
impl GuideStore for HttpGuideStore {
    async fn list_guides(&self) -> Result<Vec<GuideResource>, BackendError> {
        let url = self.collection_url()?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if is_not_available(status) {
            warn!(%status, %url, "guide list not available on this backend");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        let list: ResourceList = response.json().await?;
        debug!(count = list.items.len(), "listed guides");
        Ok(list.items)
    }

    async fn get_guide(&self, name: &str) -> Result<Option<GuideResource>, BackendError> {
        let url = self.resource_url(name)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if is_not_available(status) {
            warn!(%status, %url, "guide fetch not available on this backend");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        Ok(Some(response.json().await?))
    }

    async fn save_guide(&self, guide: &Guide) -> Result<Option<GuideResource>, BackendError> {
        let mut resource = GuideResource::wrap(guide, self.namespace.clone())?;
        let name = resource.metadata.name.clone();

        // Update requires the server's resourceVersion; create must not
        // carry one. One GET decides which path we take.
        let existing = self.get_guide(&name).await?;
        let (response, url) = match existing {
            Some(current) => {
                resource.metadata.resource_version = current.metadata.resource_version;
                let url = self.resource_url(&name)?;
                (
                    self.client.put(url.clone()).json(&resource).send().await?,
                    url,
                )
            }
            None => {
                let url = self.collection_url()?;
                (
                    self.client.post(url.clone()).json(&resource).send().await?,
                    url,
                )
            }
        };

        let status = response.status();
        if is_not_available(status) {
            warn!(%status, %url, guide = %name, "guide save not available on this backend");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        debug!(guide = %name, "saved guide");
        Ok(Some(response.json().await?))
    }

    async fn delete_guide(&self, name: &str) -> Result<(), BackendError> {
        let url = self.resource_url(name)?;
        let response = self.client.delete(url.clone()).send().await?;
        let status = response.status();

        if is_not_available(status) {
            warn!(%status, %url, "guide delete not available on this backend");
            return Ok(());
        }
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        debug!(guide = %name, "deleted guide");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_set_is_exact() {
        for code in [400u16, 403, 404, 405, 501, 503] {
            assert!(is_not_available(StatusCode::from_u16(code).unwrap()));
        }
        for code in [401u16, 409, 410, 429, 500, 502] {
            assert!(!is_not_available(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn urls_are_namespaced() {
        let store = HttpGuideStore::new("http://backend.local/", "tutorials").unwrap();
        assert_eq!(
            store.resource_url("my-guide").unwrap().as_str(),
            format!("http://backend.local/apis/{API_VERSION}/namespaces/tutorials/interactiveguides/my-guide")
        );
    }
}
