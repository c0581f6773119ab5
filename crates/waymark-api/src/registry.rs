//! Static block-type metadata for the editor palette.
//!
//! `BlockKind` is the fieldless mirror of `Block`; the registry maps every
//! kind to its display metadata and fixes the palette ordering. Both are
//! exhaustive matches, so a new `Block` variant cannot be added without
//! the compiler pointing here.

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Discriminant of `Block`, used wherever a type is needed without a value
/// (palette entries, validation messages, telemetry).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Markdown,
    Html,
    Image,
    Video,
    Section,
    Conditional,
    Interactive,
    Multistep,
    Guided,
    Quiz,
    Input,
}

/// Display metadata for one block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTypeInfo {
    pub display_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// Palette ordering: prose first, media, containers, interaction, prompts.
pub const PALETTE_ORDER: [BlockKind; 11] = [
    BlockKind::Markdown,
    BlockKind::Html,
    BlockKind::Image,
    BlockKind::Video,
    BlockKind::Section,
    BlockKind::Conditional,
    BlockKind::Interactive,
    BlockKind::Multistep,
    BlockKind::Guided,
    BlockKind::Quiz,
    BlockKind::Input,
];

impl BlockKind {
    /// The wire name of this kind (matches the serde `type` tag).
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Markdown => "markdown",
            BlockKind::Html => "html",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Section => "section",
            BlockKind::Conditional => "conditional",
            BlockKind::Interactive => "interactive",
            BlockKind::Multistep => "multistep",
            BlockKind::Guided => "guided",
            BlockKind::Quiz => "quiz",
            BlockKind::Input => "input",
        }
    }

    /// Parse a wire name into a kind.
    pub fn parse(s: &str) -> Option<BlockKind> {
        PALETTE_ORDER.iter().copied().find(|k| k.as_str() == s)
    }

    /// Whether blocks of this kind own nested children.
    pub fn is_container(&self) -> bool {
        matches!(self, BlockKind::Section | BlockKind::Conditional)
    }

    /// Display metadata for the palette and block headers.
    pub fn info(&self) -> BlockTypeInfo {
        match self {
            BlockKind::Markdown => BlockTypeInfo {
                display_name: "Markdown",
                icon: "document-info",
                description: "Formatted text content",
            },
            BlockKind::Html => BlockTypeInfo {
                display_name: "HTML",
                icon: "code-branch",
                description: "Raw HTML content",
            },
            BlockKind::Image => BlockTypeInfo {
                display_name: "Image",
                icon: "camera",
                description: "An image with optional caption",
            },
            BlockKind::Video => BlockTypeInfo {
                display_name: "Video",
                icon: "play",
                description: "An embedded video",
            },
            BlockKind::Section => BlockTypeInfo {
                display_name: "Section",
                icon: "folder",
                description: "A titled group of blocks",
            },
            BlockKind::Conditional => BlockTypeInfo {
                display_name: "Conditional",
                icon: "toggle-on",
                description: "Content shown only when conditions hold",
            },
            BlockKind::Interactive => BlockTypeInfo {
                display_name: "Interactive",
                icon: "mouse-alt",
                description: "A single action on a page element",
            },
            BlockKind::Multistep => BlockTypeInfo {
                display_name: "Multistep",
                icon: "list-ol",
                description: "An automated sequence of actions",
            },
            BlockKind::Guided => BlockTypeInfo {
                display_name: "Guided",
                icon: "compass",
                description: "A user-paced sequence of actions",
            },
            BlockKind::Quiz => BlockTypeInfo {
                display_name: "Quiz",
                icon: "question-circle",
                description: "A multiple-choice question",
            },
            BlockKind::Input => BlockTypeInfo {
                display_name: "Input",
                icon: "keyboard",
                description: "A prompt asking the user for a value",
            },
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Block {
    /// The kind (type tag) of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Markdown { .. } => BlockKind::Markdown,
            Block::Html { .. } => BlockKind::Html,
            Block::Image { .. } => BlockKind::Image,
            Block::Video { .. } => BlockKind::Video,
            Block::Section { .. } => BlockKind::Section,
            Block::Conditional { .. } => BlockKind::Conditional,
            Block::Interactive { .. } => BlockKind::Interactive,
            Block::Multistep { .. } => BlockKind::Multistep,
            Block::Guided { .. } => BlockKind::Guided,
            Block::Quiz { .. } => BlockKind::Quiz,
            Block::Input { .. } => BlockKind::Input,
        }
    }
}
