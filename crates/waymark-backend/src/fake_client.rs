//! Fake guide store for testing.
//!
//! In-memory implementation of `GuideStore` so tests exercise the same
//! persistence path as production with only the HTTP layer swapped out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use waymark_api::Guide;

use crate::client::GuideStore;
use crate::error::BackendError;
use crate::resource::GuideResource;

/// In-memory guide store keyed by resource name.
pub struct FakeGuideStore {
    namespace: String,
    resources: RwLock<HashMap<String, GuideResource>>,
    version_counter: AtomicU64,
}

impl FakeGuideStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        info!("[FakeGuideStore] creating new fake store");
        Self {
            namespace: namespace.into(),
            resources: RwLock::new(HashMap::new()),
            version_counter: AtomicU64::new(1),
        }
    }

    fn next_resource_version(&self) -> String {
        self.version_counter.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

impl Default for FakeGuideStore {
    fn default() -> Self {
        Self::new("default")
    }
}

#[async_trait]
impl GuideStore for FakeGuideStore {
    async fn list_guides(&self) -> Result<Vec<GuideResource>, BackendError> {
        let resources = self.resources.read().await;
        let mut items: Vec<GuideResource> = resources.values().cloned().collect();
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        info!("[FakeGuideStore] list_guides returning {} items", items.len());
        Ok(items)
    }

    async fn get_guide(&self, name: &str) -> Result<Option<GuideResource>, BackendError> {
        let resources = self.resources.read().await;
        Ok(resources.get(name).cloned())
    }

    async fn save_guide(&self, guide: &Guide) -> Result<Option<GuideResource>, BackendError> {
        let mut resource = GuideResource::wrap(guide, self.namespace.clone())?;
        resource.metadata.resource_version = Some(self.next_resource_version());

        let name = resource.metadata.name.clone();
        info!("[FakeGuideStore] save_guide '{}'", name);
        let mut resources = self.resources.write().await;
        resources.insert(name, resource.clone());
        Ok(Some(resource))
    }

    async fn delete_guide(&self, name: &str) -> Result<(), BackendError> {
        let mut resources = self.resources.write().await;
        if resources.remove(name).is_some() {
            info!("[FakeGuideStore] delete_guide '{}'", name);
        }
        Ok(())
    }
}
