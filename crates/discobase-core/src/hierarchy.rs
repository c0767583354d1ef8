//! Conversation Hierarchy
//!
//! Conversation titles are slash-delimited paths
//! (`"WHIRLING / KIM / FIRST MEETING"`). This module folds them into a tree,
//! then collapses single-child chains so the browser shows
//! `"WHIRLING / KIM / FIRST MEETING #12"` as one node instead of three nested
//! ones.
//!
//! Construction is three passes:
//! 1. Insert every id at the node its title path ends on
//! 2. Collapse, building each child map anew rather than editing it in place
//! 3. Annotate `subtree_size` bottom-up
//!
//! Children are kept in a `BTreeMap`, so iteration is in code-point order of
//! the post-collapse labels.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ConversationSummary, ConversationType};

// ============================================================================
// TREE NODE
// ============================================================================

/// One node of the title tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Display label; empty for the root
    pub label: String,
    pub children: BTreeMap<String, TreeNode>,
    /// Conversations whose title path ends here. More than one only when
    /// two conversations share a title.
    pub ids: Vec<i64>,
    /// Number of ids in this node and all descendants
    pub subtree_size: usize,
}

impl TreeNode {
    fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// A single conversation with nothing below it
    pub fn is_collapsed_leaf(&self) -> bool {
        self.children.is_empty() && self.ids.len() == 1
    }

    /// The conversation a collapsed leaf stands for
    pub fn leaf_id(&self) -> Option<i64> {
        if self.is_collapsed_leaf() {
            self.ids.first().copied()
        } else {
            None
        }
    }

    /// Whether the node gets an expand/collapse affordance
    pub fn shows_toggle(&self) -> bool {
        self.subtree_size > 1 && !self.is_collapsed_leaf()
    }

    /// Ids in this subtree, own ids first, then children in order
    pub fn all_ids(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.subtree_size);
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<i64>) {
        out.extend_from_slice(&self.ids);
        for child in self.children.values() {
            child.collect_ids(out);
        }
    }

    fn compute_sizes(&mut self) -> usize {
        let below: usize = self.children.values_mut().map(TreeNode::compute_sizes).sum();
        self.subtree_size = self.ids.len() + below;
        self.subtree_size
    }

    fn absorb(&mut self, other: TreeNode) {
        self.ids.extend(other.ids);
        for (key, child) in other.children {
            insert_or_merge(&mut self.children, key, child);
        }
    }
}

fn insert_or_merge(map: &mut BTreeMap<String, TreeNode>, key: String, node: TreeNode) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(mut slot) => slot.get_mut().absorb(node),
    }
}

// ============================================================================
// COLLAPSE
// ============================================================================

fn collapse_node(mut label: String, mut node: TreeNode) -> (String, TreeNode) {
    loop {
        if node.ids.is_empty() && node.children.len() == 1 {
            if let Some((child_label, child)) = node.children.pop_first() {
                label = format!("{} / {}", label, child_label);
                node = child;
                continue;
            }
        }
        if let Some(id) = node.leaf_id() {
            let suffix = format!(" #{}", id);
            if !label.ends_with(&suffix) {
                label.push_str(&suffix);
            }
        }
        break;
    }

    node.children = collapse_children(std::mem::take(&mut node.children));
    node.label = label.clone();
    (label, node)
}

fn collapse_children(children: BTreeMap<String, TreeNode>) -> BTreeMap<String, TreeNode> {
    let mut collapsed = BTreeMap::new();
    for (label, child) in children {
        let (label, child) = collapse_node(label, child);
        // Two chains can collapse to the same label; their contents merge
        insert_or_merge(&mut collapsed, label, child);
    }
    collapsed
}

// ============================================================================
// CONVERSATION TREE
// ============================================================================

/// A conversation referenced by a tree leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLeaf {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
}

/// The built hierarchy plus lookup maps from the input rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTree {
    pub root: TreeNode,
    pub title_by_id: BTreeMap<i64, String>,
    pub type_by_id: BTreeMap<i64, ConversationType>,
}

/// Build the collapsed title tree for a set of conversations
pub fn build_hierarchy(rows: &[ConversationSummary]) -> ConversationTree {
    let mut root = TreeNode::default();
    let mut title_by_id = BTreeMap::new();
    let mut type_by_id = BTreeMap::new();

    for row in rows {
        let title = match row.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("(id {})", row.id),
        };

        let mut node = &mut root;
        for part in title.split('/').map(str::trim) {
            node = node
                .children
                .entry(part.to_string())
                .or_insert_with(|| TreeNode::with_label(part));
        }
        node.ids.push(row.id);

        title_by_id.insert(row.id, title);
        type_by_id.insert(row.id, row.conversation_type);
    }

    root.children = collapse_children(std::mem::take(&mut root.children));
    root.compute_sizes();

    tracing::debug!(
        "Built conversation tree: {} conversations, {} top-level nodes",
        root.subtree_size,
        root.children.len()
    );

    ConversationTree {
        root,
        title_by_id,
        type_by_id,
    }
}

impl ConversationTree {
    pub fn conversation_type(&self, id: i64) -> ConversationType {
        self.type_by_id.get(&id).copied().unwrap_or_default()
    }

    /// Highlight type of a subtree: orb over task over flow
    pub fn dominant_type(&self, node: &TreeNode) -> ConversationType {
        let ids = node.all_ids();
        let has = |t: ConversationType| ids.iter().any(|id| self.conversation_type(*id) == t);
        if has(ConversationType::Orb) {
            ConversationType::Orb
        } else if has(ConversationType::Task) {
            ConversationType::Task
        } else {
            ConversationType::Flow
        }
    }

    /// Conversations whose title or id contains `text` (case-insensitive),
    /// optionally restricted to one type, in tree order
    pub fn matching_leaves(
        &self,
        text: &str,
        type_filter: Option<ConversationType>,
    ) -> Vec<TreeLeaf> {
        let needle = text.trim().to_lowercase();
        self.root
            .all_ids()
            .into_iter()
            .filter_map(|id| {
                let conversation_type = self.conversation_type(id);
                if type_filter.is_some_and(|t| t != conversation_type) {
                    return None;
                }
                let title = self.title_by_id.get(&id)?;
                let hit = needle.is_empty()
                    || title.to_lowercase().contains(&needle)
                    || id.to_string().contains(&needle);
                hit.then(|| TreeLeaf {
                    id,
                    title: title.clone(),
                    conversation_type,
                })
            })
            .collect()
    }

    /// Rebuild the tree with only conversations of one type
    pub fn filtered_by_type(&self, conversation_type: ConversationType) -> ConversationTree {
        let rows: Vec<ConversationSummary> = self
            .title_by_id
            .iter()
            .filter(|(id, _)| self.conversation_type(**id) == conversation_type)
            .map(|(id, title)| ConversationSummary::new(*id, title.clone(), conversation_type))
            .collect();
        build_hierarchy(&rows)
    }
}
