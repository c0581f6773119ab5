//! In-memory block editor for interactive guides.
//!
//! This crate owns the editing session: the id-carrying block tree, its
//! CRUD/move/nest/merge operations, dirty tracking and change
//! notification, plus the pure converters that turn recorded UI actions
//! into blocks. Persisted shapes live in `waymark-api`; import
//! validation lives in `waymark-json`.

pub mod editor;
pub mod ids;
pub mod recorder;
pub mod storage_keys;

#[cfg(test)]
mod editor_tests;

pub use editor::{Branch, ChangeCallback, EditorBlock, EditorChildren, GuideEditor};
pub use ids::BlockId;
pub use recorder::{
    group_recorded_steps, processed_steps_to_blocks, step_to_interactive_block,
    steps_to_multistep_block, ProcessedSteps, RecordedStep, DEFAULT_MULTISTEP_CONTENT,
};
pub use storage_keys::{
    ContentKey, BLOCK_EDITOR_STATE_KEY, MAX_CONTENT_KEY_LENGTH, RECORDING_STATE_KEY,
};
