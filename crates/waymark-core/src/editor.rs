//! The block editor session: a mutable, in-memory working copy of a guide.
//!
//! `GuideEditor` is the single source of truth while a guide is being
//! edited. Every block in the session tree carries a stable editor-only
//! `BlockId` — including nested children of `section` and `conditional`
//! blocks — so operations address blocks by id, never by a positional
//! encoding. Ids are stripped when the guide is serialized back out.
//!
//! Mutations are synchronous. An applied mutation bumps the revision
//! counter, marks the session dirty, and invokes the change callback with
//! a fresh `Guide` snapshot. Bad addressing (unknown id, wrong container
//! kind, out-of-range index) is a benign user-input condition: the
//! operation is a silent no-op — no revision bump, no callback, only a
//! debug log. Validation errors are the importer's job, not this layer's.

use serde::{Deserialize, Serialize};
use tracing::debug;

use waymark_api::{Block, Guide, GuideMatch, Step};

use crate::ids::BlockId;

/// Stride of the document-position sort key used when merging blocks:
/// root blocks sort at `root_index * STRIDE`, nested children at
/// `section_root_index * STRIDE + child_index`, so merge order always
/// follows visual order regardless of selection order.
const MERGE_POSITION_STRIDE: usize = 10_000;

/// One of the two child lists owned by a `conditional` block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Branch {
    WhenTrue,
    WhenFalse,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Branch::WhenTrue => f.write_str("whenTrue"),
            Branch::WhenFalse => f.write_str("whenFalse"),
        }
    }
}

// =============================================================================
// EditorBlock - id-carrying tree node
// =============================================================================

/// A block in the session tree, wrapped with its editor id.
///
/// Container children live in `children` (each with its own id); the
/// wrapped `Block` payload of a container keeps its child vectors empty
/// while in the editor. `to_block` reassembles the persisted shape.
#[derive(Debug, Clone)]
pub struct EditorBlock {
    pub id: BlockId,
    pub block: Block,
    pub children: EditorChildren,
}

/// Editor-managed child lists of a container block.
#[derive(Debug, Clone)]
pub enum EditorChildren {
    /// Leaf block.
    None,
    /// Children of a `section`.
    Section(Vec<EditorBlock>),
    /// The two branches of a `conditional`.
    Conditional {
        when_true: Vec<EditorBlock>,
        when_false: Vec<EditorBlock>,
    },
}

impl EditorBlock {
    /// Wrap a persisted block, generating fresh ids at every level.
    pub fn from_block(block: Block) -> Self {
        Self::from_block_with_id(BlockId::generate(), block)
    }

    /// Wrap a persisted block under a specific id (nested children still
    /// get fresh ids).
    pub fn from_block_with_id(id: BlockId, block: Block) -> Self {
        match block {
            Block::Section { title, blocks } => EditorBlock {
                id,
                block: Block::Section {
                    title,
                    blocks: Vec::new(),
                },
                children: EditorChildren::Section(
                    blocks.into_iter().map(EditorBlock::from_block).collect(),
                ),
            },
            Block::Conditional {
                conditions,
                when_true,
                when_false,
            } => EditorBlock {
                id,
                block: Block::Conditional {
                    conditions,
                    when_true: Vec::new(),
                    when_false: Vec::new(),
                },
                children: EditorChildren::Conditional {
                    when_true: when_true.into_iter().map(EditorBlock::from_block).collect(),
                    when_false: when_false
                        .into_iter()
                        .map(EditorBlock::from_block)
                        .collect(),
                },
            },
            block => EditorBlock {
                id,
                block,
                children: EditorChildren::None,
            },
        }
    }

    /// Reassemble the persisted block shape, dropping editor ids.
    pub fn to_block(&self) -> Block {
        match (&self.block, &self.children) {
            (Block::Section { title, .. }, EditorChildren::Section(children)) => Block::Section {
                title: title.clone(),
                blocks: children.iter().map(EditorBlock::to_block).collect(),
            },
            (
                Block::Conditional { conditions, .. },
                EditorChildren::Conditional {
                    when_true,
                    when_false,
                },
            ) => Block::Conditional {
                conditions: conditions.clone(),
                when_true: when_true.iter().map(EditorBlock::to_block).collect(),
                when_false: when_false.iter().map(EditorBlock::to_block).collect(),
            },
            (block, _) => block.clone(),
        }
    }

    /// Deep copy with fresh ids at every level.
    fn clone_with_fresh_ids(&self) -> EditorBlock {
        EditorBlock::from_block(self.to_block())
    }

    fn is_container(&self) -> bool {
        self.block.is_container()
    }
}

/// Internal: one descent hop from a container to a child.
#[derive(Debug, Clone, Copy)]
enum Hop {
    Section(usize),
    Branch(Branch, usize),
}

/// Internal: the position of a node in the tree.
#[derive(Debug, Clone)]
struct Location {
    root: usize,
    hops: Vec<Hop>,
}

// =============================================================================
// GuideEditor - the state store
// =============================================================================

/// Change callback invoked with a snapshot after each applied mutation.
pub type ChangeCallback = Box<dyn FnMut(&Guide) + Send>;

/// The in-memory editing session for one guide.
pub struct GuideEditor {
    meta: Guide,
    roots: Vec<EditorBlock>,
    dirty: bool,
    revision: u64,
    on_change: Option<ChangeCallback>,
}

impl Default for GuideEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideEditor {
    /// Create an editor holding an empty, untitled guide.
    pub fn new() -> Self {
        Self {
            meta: Guide::default(),
            roots: Vec::new(),
            dirty: false,
            revision: 0,
            on_change: None,
        }
    }

    /// Create an editor seeded from an existing guide.
    pub fn from_guide(guide: Guide) -> Self {
        let mut editor = Self::new();
        editor.load_guide(guide, None);
        editor
    }

    /// Register the change callback. Replaces any previous callback.
    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    // --- Lifecycle -----------------------------------------------------------

    /// Replace the whole session with `guide`.
    ///
    /// `root_ids`, if supplied (from a persisted session), is reused
    /// positionally for root blocks so UI identity stays stable across
    /// reloads; nested blocks always get fresh ids. The load is a
    /// checkpoint: the session comes up clean.
    pub fn load_guide(&mut self, guide: Guide, root_ids: Option<&[BlockId]>) {
        let Guide {
            id,
            title,
            schema_version,
            match_rules,
            blocks,
        } = guide;
        self.meta = Guide {
            id,
            title,
            schema_version,
            match_rules,
            blocks: Vec::new(),
        };
        self.roots = blocks.into_iter().map(EditorBlock::from_block).collect();
        if let Some(ids) = root_ids {
            for (root, id) in self.roots.iter_mut().zip(ids) {
                root.id = id.clone();
            }
        }
        self.dirty = false;
        self.revision += 1;
        self.notify();
    }

    /// Reset to a fresh empty guide.
    pub fn reset_guide(&mut self) {
        self.load_guide(Guide::default(), None);
    }

    /// Serialize the session back to the persisted guide shape.
    pub fn get_guide(&self) -> Guide {
        let mut guide = self.meta.clone();
        guide.blocks = self.roots.iter().map(EditorBlock::to_block).collect();
        guide
    }

    /// Record that the current state has been persisted. Idempotent: a
    /// second call in a row changes nothing and notifies nobody.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Whether the session has diverged from the last load/save checkpoint.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Monotonic counter bumped on every applied state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current root block ids, in order (for session persistence).
    pub fn root_ids(&self) -> Vec<BlockId> {
        self.roots.iter().map(|b| b.id.clone()).collect()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Look up a block anywhere in the tree.
    pub fn block(&self, id: &BlockId) -> Option<&EditorBlock> {
        let loc = self.locate(id)?;
        self.node(&loc)
    }

    // --- Metadata edits ------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.meta.title = title.into();
        self.changed();
    }

    pub fn set_match_rules(&mut self, match_rules: Option<GuideMatch>) {
        self.meta.match_rules = match_rules;
        self.changed();
    }

    // --- Root-level CRUD -----------------------------------------------------

    /// Insert a block at `index` (clamped) or append. Returns the new id.
    ///
    /// No shape validation happens here; a malformed block is stored
    /// as-is and surfaces through the importer/validator instead.
    pub fn add_block(&mut self, block: Block, index: Option<usize>) -> BlockId {
        let node = EditorBlock::from_block(block);
        let id = node.id.clone();
        let index = index.unwrap_or(self.roots.len()).min(self.roots.len());
        self.roots.insert(index, node);
        self.changed();
        id
    }

    /// Replace the block under `id` (anywhere in the tree) with a new
    /// payload. The id is kept; nested content of a replacement container
    /// gets fresh ids.
    pub fn update_block(&mut self, id: &BlockId, block: Block) -> bool {
        let Some(loc) = self.locate(id) else {
            debug!("update_block: unknown id {id}, ignoring");
            return false;
        };
        if let Some(node) = self.node_mut(&loc) {
            *node = EditorBlock::from_block_with_id(id.clone(), block);
            self.changed();
            true
        } else {
            false
        }
    }

    /// Remove the block under `id` (anywhere in the tree), children and all.
    pub fn remove_block(&mut self, id: &BlockId) -> bool {
        if self.detach(id).is_none() {
            debug!("remove_block: unknown id {id}, ignoring");
            return false;
        }
        self.changed();
        true
    }

    /// Reorder root blocks. `from == to` and out-of-range indices no-op.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.roots.len() || to >= self.roots.len() {
            debug!("move_block: {from} -> {to} out of range or trivial, ignoring");
            return false;
        }
        let node = self.roots.remove(from);
        self.roots.insert(to, node);
        self.changed();
        true
    }

    /// Deep-copy a root block (fresh ids at every level) and insert the
    /// copy immediately after the original.
    pub fn duplicate_block(&mut self, id: &BlockId) -> Option<BlockId> {
        let Some(index) = self.roots.iter().position(|b| &b.id == id) else {
            debug!("duplicate_block: unknown root id {id}, ignoring");
            return None;
        };
        let copy = self.roots[index].clone_with_fresh_ids();
        let copy_id = copy.id.clone();
        self.roots.insert(index + 1, copy);
        self.changed();
        Some(copy_id)
    }

    // --- Section nesting -----------------------------------------------------

    /// Move a root block into a section's child list.
    ///
    /// No-ops if either id is missing, the target is not a section, or
    /// the moved block is itself a container (containers are never nested
    /// into containers by editing operations).
    pub fn nest_block_in_section(
        &mut self,
        block_id: &BlockId,
        section_id: &BlockId,
        insert_index: Option<usize>,
    ) -> bool {
        let Some(source) = self.roots.iter().position(|b| &b.id == block_id) else {
            debug!("nest_block_in_section: {block_id} is not a root block, ignoring");
            return false;
        };
        if self.roots[source].is_container() {
            debug!("nest_block_in_section: {block_id} is a container, ignoring");
            return false;
        }
        if self.section_children(section_id).is_none() {
            debug!("nest_block_in_section: {section_id} is not a section, ignoring");
            return false;
        }
        let node = self.roots.remove(source);
        // Pre-checked: the section exists and is not the removed node.
        let children = self
            .section_children_mut(section_id)
            .expect("section verified above");
        let index = insert_index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        self.changed();
        true
    }

    /// Move a section child back to the root list. Without an explicit
    /// root index the block lands right after its former section.
    pub fn unnest_block_from_section(
        &mut self,
        block_id: &BlockId,
        section_id: &BlockId,
        insert_at: Option<usize>,
    ) -> bool {
        let Some(section_loc) = self.locate(section_id) else {
            debug!("unnest_block_from_section: unknown section {section_id}, ignoring");
            return false;
        };
        let Some(children) = self.section_children(section_id) else {
            debug!("unnest_block_from_section: {section_id} is not a section, ignoring");
            return false;
        };
        let Some(child_index) = children.iter().position(|b| &b.id == block_id) else {
            debug!("unnest_block_from_section: {block_id} not in {section_id}, ignoring");
            return false;
        };
        let node = self
            .section_children_mut(section_id)
            .expect("section verified above")
            .remove(child_index);
        let default_index = section_loc.root + 1;
        let index = insert_at.unwrap_or(default_index).min(self.roots.len());
        self.roots.insert(index, node);
        self.changed();
        true
    }

    // --- Conditional branch CRUD ---------------------------------------------

    /// Insert a new block into a conditional branch. Container payloads
    /// are rejected, same as for sections.
    pub fn add_block_to_branch(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
        block: Block,
        index: Option<usize>,
    ) -> Option<BlockId> {
        if block.is_container() {
            debug!("add_block_to_branch: refusing to nest a container, ignoring");
            return None;
        }
        let Some(children) = self.branch_children_mut(conditional_id, branch) else {
            debug!("add_block_to_branch: {conditional_id} is not a conditional, ignoring");
            return None;
        };
        let node = EditorBlock::from_block(block);
        let id = node.id.clone();
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        self.changed();
        Some(id)
    }

    /// Replace a branch child's payload, keeping its id.
    pub fn update_branch_block(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
        block_id: &BlockId,
        block: Block,
    ) -> bool {
        let Some(children) = self.branch_children_mut(conditional_id, branch) else {
            debug!("update_branch_block: {conditional_id} is not a conditional, ignoring");
            return false;
        };
        let Some(child) = children.iter_mut().find(|b| &b.id == block_id) else {
            debug!("update_branch_block: {block_id} not in {branch} of {conditional_id}");
            return false;
        };
        *child = EditorBlock::from_block_with_id(block_id.clone(), block);
        self.changed();
        true
    }

    /// Delete a branch child.
    pub fn delete_branch_block(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
        block_id: &BlockId,
    ) -> bool {
        let Some(children) = self.branch_children_mut(conditional_id, branch) else {
            debug!("delete_branch_block: {conditional_id} is not a conditional, ignoring");
            return false;
        };
        let Some(index) = children.iter().position(|b| &b.id == block_id) else {
            debug!("delete_branch_block: {block_id} not in {branch} of {conditional_id}");
            return false;
        };
        children.remove(index);
        self.changed();
        true
    }

    /// Deep-copy a branch child in place, right after the original.
    pub fn duplicate_branch_block(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
        block_id: &BlockId,
    ) -> Option<BlockId> {
        let Some(children) = self.branch_children_mut(conditional_id, branch) else {
            debug!("duplicate_branch_block: {conditional_id} is not a conditional, ignoring");
            return None;
        };
        let index = children.iter().position(|b| &b.id == block_id)?;
        let copy = children[index].clone_with_fresh_ids();
        let copy_id = copy.id.clone();
        children.insert(index + 1, copy);
        self.changed();
        Some(copy_id)
    }

    /// Reorder within a branch. `from == to` and out-of-range no-op.
    pub fn move_branch_block(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
        from: usize,
        to: usize,
    ) -> bool {
        let Some(children) = self.branch_children_mut(conditional_id, branch) else {
            debug!("move_branch_block: {conditional_id} is not a conditional, ignoring");
            return false;
        };
        if from == to || from >= children.len() || to >= children.len() {
            debug!("move_branch_block: {from} -> {to} out of range or trivial, ignoring");
            return false;
        }
        let node = children.remove(from);
        children.insert(to, node);
        self.changed();
        true
    }

    /// Move a root block into a conditional branch.
    pub fn nest_block_in_conditional(
        &mut self,
        block_id: &BlockId,
        conditional_id: &BlockId,
        branch: Branch,
        insert_index: Option<usize>,
    ) -> bool {
        let Some(source) = self.roots.iter().position(|b| &b.id == block_id) else {
            debug!("nest_block_in_conditional: {block_id} is not a root block, ignoring");
            return false;
        };
        if self.roots[source].is_container() {
            debug!("nest_block_in_conditional: {block_id} is a container, ignoring");
            return false;
        }
        if self.branch_children(conditional_id, branch).is_none() {
            debug!("nest_block_in_conditional: {conditional_id} is not a conditional, ignoring");
            return false;
        }
        let node = self.roots.remove(source);
        let children = self
            .branch_children_mut(conditional_id, branch)
            .expect("conditional verified above");
        let index = insert_index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        self.changed();
        true
    }

    /// Move a branch child back to the root list.
    pub fn unnest_block_from_conditional(
        &mut self,
        block_id: &BlockId,
        conditional_id: &BlockId,
        branch: Branch,
        insert_at: Option<usize>,
    ) -> bool {
        let Some(conditional_loc) = self.locate(conditional_id) else {
            debug!("unnest_block_from_conditional: unknown id {conditional_id}, ignoring");
            return false;
        };
        let Some(children) = self.branch_children(conditional_id, branch) else {
            debug!("unnest_block_from_conditional: {conditional_id} is not a conditional");
            return false;
        };
        let Some(child_index) = children.iter().position(|b| &b.id == block_id) else {
            debug!("unnest_block_from_conditional: {block_id} not in {branch}, ignoring");
            return false;
        };
        let node = self
            .branch_children_mut(conditional_id, branch)
            .expect("conditional verified above")
            .remove(child_index);
        let default_index = conditional_loc.root + 1;
        let index = insert_at.unwrap_or(default_index).min(self.roots.len());
        self.roots.insert(index, node);
        self.changed();
        true
    }

    // --- Cross-container moves -----------------------------------------------
    //
    // Each locates both containers up front, no-ops if anything is miss-
    // addressed, and publishes both sides of the move in one revision:
    // observers never see an intermediate state.

    /// Move a child between conditional branches (same or different
    /// conditional).
    pub fn move_block_between_branches(
        &mut self,
        source_conditional_id: &BlockId,
        target_conditional_id: &BlockId,
        block_id: &BlockId,
        from_branch: Branch,
        to_branch: Branch,
        insert_index: Option<usize>,
    ) -> bool {
        let Some(source) = self.branch_children(source_conditional_id, from_branch) else {
            debug!("move_block_between_branches: bad source {source_conditional_id}, ignoring");
            return false;
        };
        let Some(child_index) = source.iter().position(|b| &b.id == block_id) else {
            debug!("move_block_between_branches: {block_id} not in {from_branch}, ignoring");
            return false;
        };
        if source[child_index].is_container() {
            debug!("move_block_between_branches: {block_id} is a container, ignoring");
            return false;
        }
        let same_container =
            source_conditional_id == target_conditional_id && from_branch == to_branch;
        if !same_container && self.branch_children(target_conditional_id, to_branch).is_none() {
            debug!("move_block_between_branches: bad target {target_conditional_id}, ignoring");
            return false;
        }
        let node = self
            .branch_children_mut(source_conditional_id, from_branch)
            .expect("source verified above")
            .remove(child_index);
        let target = self
            .branch_children_mut(target_conditional_id, to_branch)
            .expect("target verified above");
        let index = insert_index.unwrap_or(target.len()).min(target.len());
        target.insert(index, node);
        self.changed();
        true
    }

    /// Move a child between two sections.
    pub fn move_block_between_sections(
        &mut self,
        block_id: &BlockId,
        from_section_id: &BlockId,
        to_section_id: &BlockId,
        insert_index: Option<usize>,
    ) -> bool {
        let Some(source) = self.section_children(from_section_id) else {
            debug!("move_block_between_sections: bad source {from_section_id}, ignoring");
            return false;
        };
        let Some(child_index) = source.iter().position(|b| &b.id == block_id) else {
            debug!("move_block_between_sections: {block_id} not in source, ignoring");
            return false;
        };
        if source[child_index].is_container() {
            debug!("move_block_between_sections: {block_id} is a container, ignoring");
            return false;
        }
        if from_section_id != to_section_id && self.section_children(to_section_id).is_none() {
            debug!("move_block_between_sections: bad target {to_section_id}, ignoring");
            return false;
        }
        let node = self
            .section_children_mut(from_section_id)
            .expect("source verified above")
            .remove(child_index);
        let target = self
            .section_children_mut(to_section_id)
            .expect("target verified above");
        let index = insert_index.unwrap_or(target.len()).min(target.len());
        target.insert(index, node);
        self.changed();
        true
    }

    // --- Merge ---------------------------------------------------------------

    /// Merge selected blocks into a single `multistep` block.
    ///
    /// Only `interactive`/`multistep`/`guided` blocks among the selection
    /// qualify; the others are skipped. Qualifying blocks are sorted by
    /// document position (see `MERGE_POSITION_STRIDE`), flattened into one
    /// step list, removed, and replaced by one merged block at the
    /// visually-first original's position. Requires at least two
    /// qualifying blocks.
    pub fn merge_blocks_to_multistep(&mut self, ids: &[BlockId]) -> Option<BlockId> {
        self.merge_blocks(ids, MergeTarget::Multistep)
    }

    /// Same as `merge_blocks_to_multistep`, producing a `guided` block.
    pub fn merge_blocks_to_guided(&mut self, ids: &[BlockId]) -> Option<BlockId> {
        self.merge_blocks(ids, MergeTarget::Guided)
    }

    fn merge_blocks(&mut self, ids: &[BlockId], target: MergeTarget) -> Option<BlockId> {
        // Candidates are root blocks and direct children of root-level
        // sections; that is everything the selection UI can offer.
        struct Candidate {
            id: BlockId,
            key: usize,
            nested_in: Option<BlockId>,
            anchor: usize,
        }
        let mut candidates: Vec<Candidate> = Vec::new();
        for (root_index, root) in self.roots.iter().enumerate() {
            if ids.contains(&root.id) && merge_qualifies(&root.block) {
                candidates.push(Candidate {
                    id: root.id.clone(),
                    key: root_index * MERGE_POSITION_STRIDE,
                    nested_in: None,
                    anchor: root_index,
                });
            }
            if let EditorChildren::Section(children) = &root.children {
                for (child_index, child) in children.iter().enumerate() {
                    if ids.contains(&child.id) && merge_qualifies(&child.block) {
                        candidates.push(Candidate {
                            id: child.id.clone(),
                            key: root_index * MERGE_POSITION_STRIDE + child_index,
                            nested_in: Some(root.id.clone()),
                            anchor: root_index,
                        });
                    }
                }
            }
        }
        if candidates.len() < 2 {
            debug!(
                "merge_blocks: {} qualifying block(s), need at least 2, ignoring",
                candidates.len()
            );
            return None;
        }
        candidates.sort_by_key(|c| c.key);

        let mut steps: Vec<Step> = Vec::new();
        let mut content: Option<String> = None;
        for candidate in &candidates {
            let node = self.block(&candidate.id).expect("candidate located above");
            if content.is_none() {
                content = merge_content(&node.block);
            }
            steps.extend(flatten_to_steps(&node.block));
        }

        // The first candidate has the minimal position key, so every root
        // removed below sits at a strictly larger index and the anchor
        // index stays valid.
        let anchor = candidates[0].anchor;
        for candidate in &candidates {
            match &candidate.nested_in {
                None => {
                    self.roots.retain(|b| b.id != candidate.id);
                }
                Some(section_id) => {
                    if let Some(children) = self.section_children_mut(section_id) {
                        children.retain(|b| b.id != candidate.id);
                    }
                }
            }
        }

        let merged = match target {
            MergeTarget::Multistep => Block::Multistep {
                content,
                steps,
                requirements: None,
                skippable: None,
            },
            MergeTarget::Guided => Block::Guided {
                content,
                steps,
                requirements: None,
                skippable: None,
            },
        };
        let node = EditorBlock::from_block(merged);
        let id = node.id.clone();
        self.roots.insert(anchor.min(self.roots.len()), node);
        self.changed();
        Some(id)
    }

    // --- Internals -----------------------------------------------------------

    fn changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
        self.notify();
    }

    fn notify(&mut self) {
        if self.on_change.is_some() {
            let snapshot = self.get_guide();
            if let Some(callback) = self.on_change.as_mut() {
                callback(&snapshot);
            }
        }
    }

    fn locate(&self, id: &BlockId) -> Option<Location> {
        for (root, node) in self.roots.iter().enumerate() {
            if &node.id == id {
                return Some(Location {
                    root,
                    hops: Vec::new(),
                });
            }
            if let Some(hops) = locate_in(node, id) {
                return Some(Location { root, hops });
            }
        }
        None
    }

    fn node(&self, loc: &Location) -> Option<&EditorBlock> {
        let mut current = self.roots.get(loc.root)?;
        for hop in &loc.hops {
            current = match (hop, &current.children) {
                (Hop::Section(i), EditorChildren::Section(children)) => children.get(*i)?,
                (
                    Hop::Branch(Branch::WhenTrue, i),
                    EditorChildren::Conditional { when_true, .. },
                ) => when_true.get(*i)?,
                (
                    Hop::Branch(Branch::WhenFalse, i),
                    EditorChildren::Conditional { when_false, .. },
                ) => when_false.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn node_mut(&mut self, loc: &Location) -> Option<&mut EditorBlock> {
        let mut current = self.roots.get_mut(loc.root)?;
        for hop in &loc.hops {
            current = match (hop, &mut current.children) {
                (Hop::Section(i), EditorChildren::Section(children)) => children.get_mut(*i)?,
                (
                    Hop::Branch(Branch::WhenTrue, i),
                    EditorChildren::Conditional { when_true, .. },
                ) => when_true.get_mut(*i)?,
                (
                    Hop::Branch(Branch::WhenFalse, i),
                    EditorChildren::Conditional { when_false, .. },
                ) => when_false.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Remove the node under `id` from wherever it lives.
    fn detach(&mut self, id: &BlockId) -> Option<EditorBlock> {
        let loc = self.locate(id)?;
        match loc.hops.split_last() {
            None => Some(self.roots.remove(loc.root)),
            Some((last, parent_hops)) => {
                let parent_loc = Location {
                    root: loc.root,
                    hops: parent_hops.to_vec(),
                };
                let parent = self.node_mut(&parent_loc)?;
                match (last, &mut parent.children) {
                    (Hop::Section(i), EditorChildren::Section(children)) => {
                        Some(children.remove(*i))
                    }
                    (
                        Hop::Branch(Branch::WhenTrue, i),
                        EditorChildren::Conditional { when_true, .. },
                    ) => Some(when_true.remove(*i)),
                    (
                        Hop::Branch(Branch::WhenFalse, i),
                        EditorChildren::Conditional { when_false, .. },
                    ) => Some(when_false.remove(*i)),
                    _ => None,
                }
            }
        }
    }

    fn section_children(&self, section_id: &BlockId) -> Option<&Vec<EditorBlock>> {
        let loc = self.locate(section_id)?;
        match &self.node(&loc)?.children {
            EditorChildren::Section(children) => Some(children),
            _ => None,
        }
    }

    fn section_children_mut(&mut self, section_id: &BlockId) -> Option<&mut Vec<EditorBlock>> {
        let loc = self.locate(section_id)?;
        match &mut self.node_mut(&loc)?.children {
            EditorChildren::Section(children) => Some(children),
            _ => None,
        }
    }

    fn branch_children(&self, conditional_id: &BlockId, branch: Branch) -> Option<&Vec<EditorBlock>> {
        let loc = self.locate(conditional_id)?;
        match (&self.node(&loc)?.children, branch) {
            (EditorChildren::Conditional { when_true, .. }, Branch::WhenTrue) => Some(when_true),
            (EditorChildren::Conditional { when_false, .. }, Branch::WhenFalse) => Some(when_false),
            _ => None,
        }
    }

    fn branch_children_mut(
        &mut self,
        conditional_id: &BlockId,
        branch: Branch,
    ) -> Option<&mut Vec<EditorBlock>> {
        let loc = self.locate(conditional_id)?;
        match (&mut self.node_mut(&loc)?.children, branch) {
            (EditorChildren::Conditional { when_true, .. }, Branch::WhenTrue) => Some(when_true),
            (EditorChildren::Conditional { when_false, .. }, Branch::WhenFalse) => Some(when_false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MergeTarget {
    Multistep,
    Guided,
}

fn merge_qualifies(block: &Block) -> bool {
    matches!(
        block,
        Block::Interactive { .. } | Block::Multistep { .. } | Block::Guided { .. }
    )
}

fn merge_content(block: &Block) -> Option<String> {
    match block {
        Block::Interactive { content, .. }
        | Block::Multistep { content, .. }
        | Block::Guided { content, .. } => content.clone(),
        _ => None,
    }
}

/// Flatten a qualifying block into the steps it contributes to a merge.
fn flatten_to_steps(block: &Block) -> Vec<Step> {
    match block {
        Block::Interactive {
            action,
            reftarget,
            content,
            targetvalue,
            requirements,
            skippable,
        } => {
            let mut step = Step::new(*action);
            step.reftarget = reftarget.clone();
            step.targetvalue = targetvalue.clone();
            step.tooltip = content.clone();
            step.requirements = requirements.clone();
            step.skippable = *skippable;
            vec![step]
        }
        Block::Multistep { steps, .. } | Block::Guided { steps, .. } => steps.clone(),
        _ => Vec::new(),
    }
}

fn locate_in(node: &EditorBlock, id: &BlockId) -> Option<Vec<Hop>> {
    match &node.children {
        EditorChildren::None => None,
        EditorChildren::Section(children) => scan_children(children, id, Hop::Section),
        EditorChildren::Conditional {
            when_true,
            when_false,
        } => scan_children(when_true, id, |i| Hop::Branch(Branch::WhenTrue, i)).or_else(|| {
            scan_children(when_false, id, |i| Hop::Branch(Branch::WhenFalse, i))
        }),
    }
}

fn scan_children(
    children: &[EditorBlock],
    id: &BlockId,
    make_hop: impl Fn(usize) -> Hop,
) -> Option<Vec<Hop>> {
    for (i, child) in children.iter().enumerate() {
        if &child.id == id {
            return Some(vec![make_hop(i)]);
        }
        if let Some(rest) = locate_in(child, id) {
            let mut hops = vec![make_hop(i)];
            hops.extend(rest);
            return Some(hops);
        }
    }
    None
}
