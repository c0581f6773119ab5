//! Synthetic identifiers for editor blocks.
//!
//! Ids exist only inside an editing session: they give UI rows stable
//! keys and let operations address blocks without positional indices.
//! They are never written into exported guide JSON.

use serde::{Deserialize, Serialize};

/// Editor-only identifier for a block in the session tree.
///
/// Format is `{timestamp_millis}-{uuid fragment}`: sortable by creation
/// time for debugging, unique within (and across) sessions. Ids are never
/// reused after deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let fragment = &uuid[..8];
        BlockId(format!("{millis}-{fragment}"))
    }

    /// Wrap an id previously issued by `generate` (e.g. restored from a
    /// persisted session).
    pub fn from_string(s: impl Into<String>) -> Self {
        BlockId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
