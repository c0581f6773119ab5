//! Conversion of recorded UI actions into guide blocks.
//!
//! A DOM-observing recorder emits a flat sequence of `RecordedStep`s.
//! This module groups consecutive steps that share a `group_id` and maps
//! the result into `interactive` (single step) and `multistep` (grouped
//! steps) blocks. Everything here is pure: no state, no side effects —
//! the caller inserts the resulting blocks into the editor.

use serde::{Deserialize, Serialize};

use waymark_api::{Block, InteractiveAction, Step};

/// Fallback content for a multistep block whose first step carries no
/// description.
pub const DEFAULT_MULTISTEP_CONTENT: &str = "Perform the following steps";

/// One action captured by the recorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedStep {
    pub action: InteractiveAction,

    /// CSS or text selector of the element the action hit.
    pub reftarget: String,

    /// Captured value (form fills).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Human description captured at record time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Grouping key: consecutive steps sharing a non-empty `group_id`
    /// belong to one logical action sequence.
    #[serde(rename = "groupId", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl RecordedStep {
    pub fn new(action: InteractiveAction, reftarget: impl Into<String>) -> Self {
        Self {
            action,
            reftarget: reftarget.into(),
            value: None,
            description: None,
            group_id: None,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Result of grouping: either a standalone step or a run of steps that
/// shared one `group_id`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedSteps {
    Single(RecordedStep),
    Group {
        group_id: String,
        steps: Vec<RecordedStep>,
    },
}

/// Run-length group consecutive steps by `group_id`.
///
/// A step with a non-empty `group_id` equal to the running group's id
/// joins that group; anything else (no id, empty id, different id) closes
/// the open group and starts fresh. Ungrouped steps become `Single`
/// entries. Order is preserved; nothing is reordered or deduplicated. A
/// run of one still becomes a `Group` — presence of a `group_id` is what
/// marks a sequence, not its length.
pub fn group_recorded_steps(steps: Vec<RecordedStep>) -> Vec<ProcessedSteps> {
    let mut processed = Vec::new();
    let mut open: Option<(String, Vec<RecordedStep>)> = None;

    for step in steps {
        let group_id = step.group_id.clone().filter(|g| !g.is_empty());
        match group_id {
            Some(id) => {
                match &mut open {
                    Some((open_id, group)) if *open_id == id => group.push(step),
                    _ => {
                        if let Some((open_id, group)) = open.take() {
                            processed.push(ProcessedSteps::Group {
                                group_id: open_id,
                                steps: group,
                            });
                        }
                        open = Some((id, vec![step]));
                    }
                }
            }
            None => {
                if let Some((open_id, group)) = open.take() {
                    processed.push(ProcessedSteps::Group {
                        group_id: open_id,
                        steps: group,
                    });
                }
                processed.push(ProcessedSteps::Single(step));
            }
        }
    }
    if let Some((open_id, group)) = open.take() {
        processed.push(ProcessedSteps::Group {
            group_id: open_id,
            steps: group,
        });
    }
    processed
}

/// Map one recorded step to an `interactive` block.
///
/// `content` falls back to a synthesized `"{action} on element"` when no
/// description was captured. `noop` actions carry no reftarget.
pub fn step_to_interactive_block(step: &RecordedStep) -> Block {
    Block::Interactive {
        action: step.action,
        reftarget: step
            .action
            .requires_reftarget()
            .then(|| step.reftarget.clone()),
        content: Some(
            step.description
                .clone()
                .unwrap_or_else(|| format!("{} on element", step.action)),
        ),
        targetvalue: step.value.clone(),
        requirements: None,
        skippable: None,
    }
}

/// Map a run of recorded steps to one `multistep` block.
///
/// The block's `content` is the first step's description (or the fixed
/// fallback); each step maps field-for-field (`value` → `targetvalue`,
/// `description` → `tooltip`).
pub fn steps_to_multistep_block(steps: &[RecordedStep]) -> Block {
    let content = steps
        .first()
        .and_then(|s| s.description.clone())
        .unwrap_or_else(|| DEFAULT_MULTISTEP_CONTENT.to_string());
    Block::Multistep {
        content: Some(content),
        steps: steps.iter().map(recorded_to_step).collect(),
        requirements: None,
        skippable: None,
    }
}

fn recorded_to_step(step: &RecordedStep) -> Step {
    let mut out = Step::new(step.action);
    out.reftarget = step
        .action
        .requires_reftarget()
        .then(|| step.reftarget.clone());
    out.targetvalue = step.value.clone();
    out.tooltip = step.description.clone();
    out
}

/// Dispatch grouped entries to the single- and multi-step converters,
/// preserving order.
pub fn processed_steps_to_blocks(processed: &[ProcessedSteps]) -> Vec<Block> {
    processed
        .iter()
        .map(|entry| match entry {
            ProcessedSteps::Single(step) => step_to_interactive_block(step),
            ProcessedSteps::Group { steps, .. } => steps_to_multistep_block(steps),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(group: Option<&str>) -> RecordedStep {
        let base = RecordedStep::new(InteractiveAction::Button, "button:x");
        match group {
            Some(g) => base.with_group(g),
            None => base,
        }
    }

    #[test]
    fn grouping_collapses_consecutive_runs() {
        let grouped = group_recorded_steps(vec![
            step(Some("g1")),
            step(Some("g1")),
            step(None),
            step(Some("g2")),
        ]);

        assert_eq!(grouped.len(), 3);
        match &grouped[0] {
            ProcessedSteps::Group { group_id, steps } => {
                assert_eq!(group_id, "g1");
                assert_eq!(steps.len(), 2);
            }
            other => panic!("expected group, got {other:?}"),
        }
        assert!(matches!(&grouped[1], ProcessedSteps::Single(_)));
        match &grouped[2] {
            ProcessedSteps::Group { group_id, steps } => {
                assert_eq!(group_id, "g2");
                assert_eq!(steps.len(), 1);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn non_consecutive_same_group_does_not_merge() {
        let grouped = group_recorded_steps(vec![step(Some("g1")), step(None), step(Some("g1"))]);
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn empty_group_id_never_groups() {
        let grouped = group_recorded_steps(vec![step(Some("")), step(Some(""))]);
        assert_eq!(grouped.len(), 2);
        assert!(grouped
            .iter()
            .all(|e| matches!(e, ProcessedSteps::Single(_))));
    }

    #[test]
    fn interactive_block_synthesizes_content() {
        let block = step_to_interactive_block(&step(None));
        match block {
            Block::Interactive { content, .. } => {
                assert_eq!(content.as_deref(), Some("button on element"));
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn interactive_block_prefers_captured_description() {
        let recorded = step(None).with_description("Click the save button");
        let block = step_to_interactive_block(&recorded);
        match block {
            Block::Interactive {
                content, reftarget, ..
            } => {
                assert_eq!(content.as_deref(), Some("Click the save button"));
                assert_eq!(reftarget.as_deref(), Some("button:x"));
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn noop_step_omits_reftarget() {
        let recorded = RecordedStep::new(InteractiveAction::Noop, "ignored");
        match step_to_interactive_block(&recorded) {
            Block::Interactive { reftarget, .. } => assert!(reftarget.is_none()),
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn multistep_maps_fields_and_falls_back_on_content() {
        let steps = vec![
            RecordedStep::new(InteractiveAction::Formfill, "input:name").with_value("demo"),
            RecordedStep::new(InteractiveAction::Button, "button:save")
                .with_description("Save the form"),
        ];
        match steps_to_multistep_block(&steps) {
            Block::Multistep {
                content,
                steps: mapped,
                ..
            } => {
                assert_eq!(content.as_deref(), Some(DEFAULT_MULTISTEP_CONTENT));
                assert_eq!(mapped[0].targetvalue.as_deref(), Some("demo"));
                assert_eq!(mapped[1].tooltip.as_deref(), Some("Save the form"));
            }
            other => panic!("expected multistep, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_preserves_order() {
        let processed = group_recorded_steps(vec![
            step(None).with_description("first"),
            step(Some("g")).with_description("second"),
            step(Some("g")),
        ]);
        let blocks = processed_steps_to_blocks(&processed);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Interactive { .. }));
        assert!(matches!(blocks[1], Block::Multistep { .. }));
    }
}
