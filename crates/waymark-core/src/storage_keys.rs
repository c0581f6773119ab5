//! Storage keys for persisting editor/recorder UI state across reloads.
//!
//! The hosting app hands the active content key down explicitly (prop or
//! constructor argument) — there is no ambient global. `ContentKey`
//! sanitizes at construction, so an unsanitized key is unrepresentable
//! past this boundary.

/// Storage key for the block editor's persisted session state.
pub const BLOCK_EDITOR_STATE_KEY: &str = "waymark.block-editor.state";

/// Storage key for the recorder's persisted UI state.
pub const RECORDING_STATE_KEY: &str = "waymark.recorder.state";

/// Maximum length of a content-derived storage key.
pub const MAX_CONTENT_KEY_LENGTH: usize = 200;

/// A sanitized content-derived storage key.
///
/// Construction strips `..` path-traversal sequences and truncates to
/// `MAX_CONTENT_KEY_LENGTH` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut cleaned = raw.as_ref().to_string();
        while cleaned.contains("..") {
            cleaned = cleaned.replace("..", "");
        }
        let truncated: String = cleaned.chars().take(MAX_CONTENT_KEY_LENGTH).collect();
        ContentKey(truncated)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
