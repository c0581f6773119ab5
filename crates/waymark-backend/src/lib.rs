//! Guide persistence against the backend's custom-resource API.
//!
//! Guides are stored as namespaced `InteractiveGuide` resources. The
//! [`GuideStore`] trait is the seam: [`HttpGuideStore`] talks REST,
//! [`FakeGuideStore`] keeps everything in memory for tests.

pub mod client;
pub mod error;
pub mod fake_client;
pub mod resource;

pub use client::{GuideStore, HttpGuideStore};
pub use error::BackendError;
pub use fake_client::FakeGuideStore;
pub use resource::{resource_name, GuideResource, ResourceMeta, API_VERSION, GUIDE_KIND};
