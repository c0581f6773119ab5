//! Data model for interactive guides.
//!
//! This crate defines the persisted shapes only: `Guide` metadata, the
//! `Block` content tree, `Step` sequences, and the static block-type
//! registry. Editor session state (ids, dirty tracking) lives in
//! `waymark-core`; import validation lives in `waymark-json`.

pub mod block;
pub mod guide;
pub mod registry;

pub use block::{Block, InputType, InteractiveAction, Step};
pub use guide::{Guide, GuideMatch, DEFAULT_SCHEMA_VERSION};
pub use registry::{BlockKind, BlockTypeInfo, PALETTE_ORDER};
