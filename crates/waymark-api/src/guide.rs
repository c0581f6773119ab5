//! Guide entity: the top-level persisted document.
//!
//! A guide is metadata (id, title, optional match rules controlling where
//! the guide is offered) plus an ordered block list. This is the exact
//! shape exchanged with the backend and with exported JSON files.

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Schema version written when a guide is saved without one.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Rules matching a guide to app locations where it should be offered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GuideMatch {
    /// URL path prefixes the guide applies to.
    #[serde(rename = "urlPrefix", default)]
    pub url_prefix: Vec<String>,

    /// Tags the guide applies to.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The top-level guide document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guide {
    pub id: String,

    pub title: String,

    #[serde(rename = "schemaVersion", skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_rules: Option<GuideMatch>,

    pub blocks: Vec<Block>,
}

impl Guide {
    /// Create an empty guide with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            schema_version: None,
            match_rules: None,
            blocks: Vec::new(),
        }
    }

    /// Builder: set the block list.
    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Builder: set the match rules.
    pub fn with_match_rules(mut self, match_rules: GuideMatch) -> Self {
        self.match_rules = Some(match_rules);
        self
    }

    /// The schema version to persist: the guide's own, or the default.
    pub fn schema_version_or_default(&self) -> &str {
        self.schema_version.as_deref().unwrap_or(DEFAULT_SCHEMA_VERSION)
    }
}

impl Default for Guide {
    fn default() -> Self {
        Guide::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_rules_serialize_under_match_key() {
        let guide = Guide::new("g1", "Getting started").with_match_rules(GuideMatch {
            url_prefix: vec!["/dashboards".to_string()],
            tags: vec![],
        });
        let json = serde_json::to_value(&guide).unwrap();
        assert_eq!(json["match"]["urlPrefix"][0], "/dashboards");
    }

    #[test]
    fn schema_version_defaults() {
        let guide = Guide::new("g1", "t");
        assert_eq!(guide.schema_version_or_default(), DEFAULT_SCHEMA_VERSION);

        let mut versioned = guide.clone();
        versioned.schema_version = Some("2.0".to_string());
        assert_eq!(versioned.schema_version_or_default(), "2.0");
    }

    #[test]
    fn unset_optionals_are_omitted() {
        let json = serde_json::to_string(&Guide::new("g1", "t")).unwrap();
        assert!(!json.contains("schemaVersion"));
        assert!(!json.contains("match"));
    }
}
