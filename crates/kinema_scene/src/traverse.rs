//! Lazy subtree traversal.
//!
//! [`Descendants`] walks a subtree depth-first, pre-order, yielding each
//! node handle exactly once. Combined with the scene's component maps it
//! replaces hand-written recursive searches:
//!
//! ```rust,ignore
//! let skinned = scene
//!     .descendants(asset_root)
//!     .find(|&handle| scene.get_skin(handle).is_some());
//! ```

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::{Node, NodeHandle};

pub struct Descendants<'a> {
    nodes: &'a SlotMap<NodeHandle, Node>,
    stack: SmallVec<[NodeHandle; 16]>,
}

impl<'a> Descendants<'a> {
    /// Starts a walk at `root` (inclusive). A stale handle yields nothing.
    #[must_use]
    pub fn new(nodes: &'a SlotMap<NodeHandle, Node>, root: NodeHandle) -> Self {
        let mut stack = SmallVec::new();
        if nodes.contains_key(root) {
            stack.push(root);
        }
        Self { nodes, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        if let Some(node) = self.nodes.get(handle) {
            // Reverse so the first child is visited first
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(handle)
    }
}
