//! Block types for the guide content tree.
//!
//! A guide is an ordered list of typed blocks. Most blocks are leaves
//! (markdown, media, interactive actions); `section` and `conditional`
//! are containers that own nested child blocks.
//!
//! `Block` is a closed sum type tagged by the `type` field in JSON, so
//! per-type behavior (validation, display metadata, step flattening) is
//! exhaustive pattern matching. Adding a block type is a compile-checked
//! single-point change.

use serde::{Deserialize, Serialize};

// =============================================================================
// Action and input enums
// =============================================================================

/// Action kinds an interactive block (or step) can perform.
///
/// All actions except `Noop` target a DOM element via `reftarget`;
/// `Formfill` additionally carries the value to fill in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveAction {
    Highlight,
    Button,
    Formfill,
    Navigate,
    Hover,
    Noop,
}

impl InteractiveAction {
    /// All known actions, in declaration order.
    pub const ALL: [InteractiveAction; 6] = [
        InteractiveAction::Highlight,
        InteractiveAction::Button,
        InteractiveAction::Formfill,
        InteractiveAction::Navigate,
        InteractiveAction::Hover,
        InteractiveAction::Noop,
    ];

    /// The wire name of this action (lowercase, as serialized).
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractiveAction::Highlight => "highlight",
            InteractiveAction::Button => "button",
            InteractiveAction::Formfill => "formfill",
            InteractiveAction::Navigate => "navigate",
            InteractiveAction::Hover => "hover",
            InteractiveAction::Noop => "noop",
        }
    }

    /// Parse a wire name back into an action.
    pub fn parse(s: &str) -> Option<InteractiveAction> {
        Self::ALL.iter().copied().find(|a| a.as_str() == s)
    }

    /// Whether this action needs a `reftarget` to act on.
    pub fn requires_reftarget(&self) -> bool {
        !matches!(self, InteractiveAction::Noop)
    }

    /// Whether this action carries a value to fill into the target.
    pub fn requires_value(&self) -> bool {
        matches!(self, InteractiveAction::Formfill)
    }
}

impl std::fmt::Display for InteractiveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input widget kinds for `input` blocks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Textarea,
    Number,
    Checkbox,
}

impl InputType {
    pub const ALL: [InputType; 4] = [
        InputType::Text,
        InputType::Textarea,
        InputType::Number,
        InputType::Checkbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Textarea => "textarea",
            InputType::Number => "number",
            InputType::Checkbox => "checkbox",
        }
    }

    pub fn parse(s: &str) -> Option<InputType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

// =============================================================================
// Step - one unit of a multistep/guided sequence
// =============================================================================

/// One unit of an automated or guided action sequence.
///
/// Steps live inside `multistep` and `guided` blocks. A `noop` step omits
/// `reftarget`; a `formfill` step carries its value in `targetvalue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub action: InteractiveAction,

    /// CSS or text selector for the element this step acts on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reftarget: Option<String>,

    /// Value to fill in (formfill steps).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetvalue: Option<String>,

    /// Tooltip shown while the step runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Requirements expression that must hold before the step runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    /// Whether the user may skip this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skippable: Option<bool>,

    /// Hint that the target renders lazily and needs a wait before acting.
    #[serde(rename = "lazyRender", skip_serializing_if = "Option::is_none")]
    pub lazy_render: Option<bool>,

    /// Selector of the scroll container the target lives in.
    #[serde(rename = "scrollContainer", skip_serializing_if = "Option::is_none")]
    pub scroll_container: Option<String>,

    /// Assistant-integration hint shown next to form fields.
    #[serde(rename = "formHint", skip_serializing_if = "Option::is_none")]
    pub form_hint: Option<String>,

    /// Whether filled input should be validated before advancing.
    #[serde(rename = "validateInput", skip_serializing_if = "Option::is_none")]
    pub validate_input: Option<bool>,
}

impl Step {
    /// Create a step with only the action set.
    pub fn new(action: InteractiveAction) -> Self {
        Self {
            action,
            reftarget: None,
            targetvalue: None,
            tooltip: None,
            requirements: None,
            skippable: None,
            lazy_render: None,
            scroll_container: None,
            form_hint: None,
            validate_input: None,
        }
    }

    /// Builder: set the reftarget.
    pub fn with_reftarget(mut self, reftarget: impl Into<String>) -> Self {
        self.reftarget = Some(reftarget.into());
        self
    }

    /// Builder: set the target value.
    pub fn with_targetvalue(mut self, value: impl Into<String>) -> Self {
        self.targetvalue = Some(value.into());
        self
    }

    /// Builder: set the tooltip.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

// =============================================================================
// Block - tagged union over all content kinds
// =============================================================================

/// One node of a guide's content tree.
///
/// Serialized with a `type` tag (`{"type": "markdown", "content": ...}`).
/// Editor-only identifiers are never part of this type; `Block` is the
/// persisted shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Markdown prose.
    Markdown { content: String },

    /// Raw (pre-sanitized) HTML.
    Html { content: String },

    /// An image with optional alt text and caption.
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },

    /// An embedded video.
    Video {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },

    /// A titled container of nested blocks.
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        blocks: Vec<Block>,
    },

    /// A two-branch container gated on a condition list.
    ///
    /// All `conditions` must evaluate true for `when_true` to render;
    /// otherwise `when_false` renders.
    Conditional {
        conditions: Vec<String>,
        #[serde(rename = "whenTrue", default)]
        when_true: Vec<Block>,
        #[serde(rename = "whenFalse", default)]
        when_false: Vec<Block>,
    },

    /// A single interactive action the guide performs or highlights.
    Interactive {
        action: InteractiveAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        reftarget: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        targetvalue: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        requirements: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        skippable: Option<bool>,
    },

    /// An automated sequence of steps executed in order.
    Multistep {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        steps: Vec<Step>,
        #[serde(skip_serializing_if = "Option::is_none")]
        requirements: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        skippable: Option<bool>,
    },

    /// A user-paced sequence of steps with per-step confirmation.
    Guided {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        steps: Vec<Step>,
        #[serde(skip_serializing_if = "Option::is_none")]
        requirements: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        skippable: Option<bool>,
    },

    /// A multiple-choice quiz.
    Quiz {
        question: String,
        options: Vec<String>,
        #[serde(rename = "correctAnswer")]
        correct_answer: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },

    /// A prompt asking the user to enter a value.
    Input {
        prompt: String,
        #[serde(rename = "inputType", skip_serializing_if = "Option::is_none")]
        input_type: Option<InputType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        required: Option<bool>,
    },
}

impl Block {
    /// Create a markdown block.
    pub fn markdown(content: impl Into<String>) -> Self {
        Block::Markdown {
            content: content.into(),
        }
    }

    /// Create an empty section with a title.
    pub fn section(title: impl Into<String>) -> Self {
        Block::Section {
            title: Some(title.into()),
            blocks: Vec::new(),
        }
    }

    /// Create an interactive block for an action/target pair.
    pub fn interactive(action: InteractiveAction, reftarget: impl Into<String>) -> Self {
        Block::Interactive {
            action,
            reftarget: Some(reftarget.into()),
            content: None,
            targetvalue: None,
            requirements: None,
            skippable: None,
        }
    }

    /// Whether this block owns nested child blocks.
    pub fn is_container(&self) -> bool {
        matches!(self, Block::Section { .. } | Block::Conditional { .. })
    }

    /// The steps owned by this block, if it is a step sequence.
    pub fn steps(&self) -> Option<&[Step]> {
        match self {
            Block::Multistep { steps, .. } | Block::Guided { steps, .. } => Some(steps),
            _ => None,
        }
    }

    /// A short plain-text summary for list previews: the leading content
    /// where the block has any, the title for sections, the question for
    /// quizzes.
    pub fn preview_text(&self) -> String {
        match self {
            Block::Markdown { content } | Block::Html { content } => {
                content.lines().next().unwrap_or("").to_string()
            }
            Block::Image { src, alt, .. } => alt.clone().unwrap_or_else(|| src.clone()),
            Block::Video { src, .. } => src.clone(),
            Block::Section { title, blocks } => title
                .clone()
                .unwrap_or_else(|| format!("{} blocks", blocks.len())),
            Block::Conditional { conditions, .. } => conditions.join(" && "),
            Block::Interactive {
                action,
                content,
                reftarget,
                ..
            } => content.clone().unwrap_or_else(|| {
                format!("{} {}", action, reftarget.as_deref().unwrap_or(""))
                    .trim_end()
                    .to_string()
            }),
            Block::Multistep { content, steps, .. } | Block::Guided { content, steps, .. } => {
                content
                    .clone()
                    .unwrap_or_else(|| format!("{} steps", steps.len()))
            }
            Block::Quiz { question, .. } => question.clone(),
            Block::Input { prompt, .. } => prompt.clone(),
        }
    }
}
