//! Custom-resource envelope wrapping a guide for backend storage.
//!
//! The backend stores guides as namespaced custom resources. The envelope
//! carries API metadata; the guide itself lives under `spec` unchanged,
//! except that `schemaVersion` is always written on save.

use serde::{Deserialize, Serialize};

use waymark_api::Guide;

use crate::error::BackendError;

/// API version the client writes. Reads accept whatever the server returns.
pub const API_VERSION: &str = "waymark.dev/v1alpha1";

/// Resource kind for stored guides.
pub const GUIDE_KIND: &str = "InteractiveGuide";

/// Resource metadata: the name addresses the resource, the version (when
/// present) is the server's concurrency token and is echoed back on update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceMeta {
    pub name: String,

    pub namespace: String,

    #[serde(rename = "resourceVersion", skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// A guide wrapped as a namespaced custom resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideResource {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    pub kind: String,

    pub metadata: ResourceMeta,

    pub spec: Guide,
}

impl GuideResource {
    /// Wrap a guide for saving into the given namespace.
    ///
    /// The resource name derives from the guide id (title as fallback),
    /// and `schemaVersion` is filled in if the guide lacks one.
    pub fn wrap(guide: &Guide, namespace: impl Into<String>) -> Result<Self, BackendError> {
        let source = if guide.id.is_empty() {
            &guide.title
        } else {
            &guide.id
        };
        let name = resource_name(source)?;

        let mut spec = guide.clone();
        if spec.schema_version.is_none() {
            spec.schema_version = Some(spec.schema_version_or_default().to_string());
        }

        Ok(Self {
            api_version: API_VERSION.to_string(),
            kind: GUIDE_KIND.to_string(),
            metadata: ResourceMeta {
                name,
                namespace: namespace.into(),
                resource_version: None,
            },
            spec,
        })
    }
}

/// Derive a resource name from a guide id or title.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single hyphen, and trims leading/trailing hyphens. An empty result is
/// an error: such a guide cannot be addressed on the backend.
pub fn resource_name(id_or_title: &str) -> Result<String, BackendError> {
    let mut name = String::with_capacity(id_or_title.len());
    let mut pending_hyphen = false;
    for ch in id_or_title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !name.is_empty() {
                name.push('-');
            }
            pending_hyphen = false;
            name.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    if name.is_empty() {
        return Err(BackendError::InvalidResourceName(id_or_title.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_api::Block;

    #[test]
    fn resource_name_sanitizes() {
        assert_eq!(resource_name("Getting Started!").unwrap(), "getting-started");
        assert_eq!(resource_name("a__b--c").unwrap(), "a-b-c");
        assert_eq!(resource_name("--Already-Kebab--").unwrap(), "already-kebab");
        assert_eq!(resource_name("MiXeD cAsE 42").unwrap(), "mixed-case-42");
    }

    #[test]
    fn resource_name_rejects_empty_results() {
        assert!(matches!(
            resource_name("!!!"),
            Err(BackendError::InvalidResourceName(_))
        ));
        assert!(matches!(
            resource_name(""),
            Err(BackendError::InvalidResourceName(_))
        ));
    }

    #[test]
    fn wrap_fills_schema_version_and_name() {
        let guide = Guide::new("My Guide", "ignored").with_blocks(vec![Block::markdown("x")]);
        let resource = GuideResource::wrap(&guide, "tutorials").unwrap();

        assert_eq!(resource.kind, GUIDE_KIND);
        assert_eq!(resource.metadata.name, "my-guide");
        assert_eq!(resource.metadata.namespace, "tutorials");
        assert_eq!(resource.spec.schema_version.as_deref(), Some("1.0"));
        assert_eq!(resource.spec.blocks, guide.blocks);
    }

    #[test]
    fn wrap_keeps_an_existing_schema_version() {
        let mut guide = Guide::new("g", "t");
        guide.schema_version = Some("2.0".to_string());
        let resource = GuideResource::wrap(&guide, "ns").unwrap();
        assert_eq!(resource.spec.schema_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn wrap_falls_back_to_the_title() {
        let guide = Guide::new("", "Fallback Title");
        let resource = GuideResource::wrap(&guide, "ns").unwrap();
        assert_eq!(resource.metadata.name, "fallback-title");
    }

    #[test]
    fn envelope_serializes_with_wire_field_names() {
        let guide = Guide::new("g1", "t");
        let resource = GuideResource::wrap(&guide, "ns").unwrap();
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["apiVersion"], API_VERSION);
        assert_eq!(json["kind"], "InteractiveGuide");
        assert_eq!(json["metadata"]["name"], "g1");
        assert_eq!(json["spec"]["id"], "g1");
    }
}
