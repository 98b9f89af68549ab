use std::collections::HashMap;

use crate::geometry::Rect;
use crate::ir::PositionedNode;

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedNode<'a> {
    pub(crate) node: &'a PositionedNode,
    pub(crate) rect: Rect,
}

impl IndexedNode<'_> {
    pub(crate) fn id(&self) -> &str {
        &self.node.id
    }
}

/// Per-call id → node lookup over the placeable nodes of a snapshot.
///
/// Nodes with non-finite geometry are left out. When ids repeat, the first
/// occurrence is the one `get` resolves to.
pub(crate) struct NodeIndex<'a> {
    entries: Vec<IndexedNode<'a>>,
    by_id: HashMap<&'a str, usize>,
    skipped: usize,
}

impl<'a> NodeIndex<'a> {
    pub(crate) fn build(nodes: &'a [PositionedNode]) -> Self {
        let mut entries = Vec::with_capacity(nodes.len());
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut skipped = 0;
        for node in nodes {
            let Some(rect) = node.rect() else {
                skipped += 1;
                continue;
            };
            by_id.entry(node.id.as_str()).or_insert(entries.len());
            entries.push(IndexedNode { node, rect });
        }
        Self {
            entries,
            by_id,
            skipped,
        }
    }

    pub(crate) fn entries(&self) -> &[IndexedNode<'a>] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nodes dropped for non-finite geometry.
    pub(crate) fn skipped(&self) -> usize {
        self.skipped
    }

    pub(crate) fn get(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn rect(&self, idx: usize) -> Rect {
        self.entries[idx].rect
    }

    /// Resolved parent of `idx`, ignoring self-references.
    pub(crate) fn parent(&self, idx: usize) -> Option<usize> {
        let parent_id = self.entries[idx].node.parent_id.as_deref()?;
        self.get(parent_id).filter(|parent| *parent != idx)
    }

    /// Whether `candidate` appears on `node`'s parent chain within
    /// `max_depth` steps. A chain that loops back on itself stops the walk.
    pub(crate) fn is_ancestor(&self, candidate: usize, node: usize, max_depth: usize) -> bool {
        let mut current = node;
        for _ in 0..max_depth {
            let Some(parent) = self.parent(current) else {
                return false;
            };
            if parent == node {
                return false;
            }
            if parent == candidate {
                return true;
            }
            current = parent;
        }
        false
    }
}
