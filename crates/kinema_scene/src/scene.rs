use glam::Affine3A;
use slotmap::{SlotMap, SparseSecondaryMap};

use crate::mesh::Mesh;
use crate::node::Node;
use crate::skeleton::{BindMode, SkinBinding, Skeleton};
use crate::transform_system;
use crate::traverse::Descendants;
use crate::{NodeHandle, SkeletonKey};

/// Scene graph.
///
/// Nodes carry only hierarchy and transform; everything else is stored in
/// sparse component maps keyed by [`NodeHandle`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    pub names: SparseSecondaryMap<NodeHandle, String>,
    pub meshes: SparseSecondaryMap<NodeHandle, Mesh>,
    pub skins: SparseSecondaryMap<NodeHandle, SkinBinding>,

    // ==== Resource pools ====
    pub skeleton_pool: SlotMap<SkeletonKey, Skeleton>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Creates an unnamed root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::new())
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.set_name(handle, name);
        handle
    }

    /// Inserts a node as a scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Removes a node, its whole subtree and all of their components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);

        let subtree: Vec<NodeHandle> = self.descendants(handle).collect();
        for node in subtree {
            self.names.remove(node);
            self.meshes.remove(node);
            self.skins.remove(node);
            self.nodes.remove(node);
        }
    }

    /// Makes `child` a child of `parent`, detaching it from its old parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Attach called with a stale node handle");
            return;
        }
        if self.descendants(child).any(|h| h == parent) {
            log::warn!("Cannot attach a node below its own descendant");
            return;
        }

        self.detach(child);

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();
    }

    /// Unlinks a node from its parent (or from the root list) without
    /// reinserting it anywhere.
    fn detach(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(parent) = self.nodes.get_mut(p)
                && let Some(i) = parent.children.iter().position(|&x| x == child)
            {
                parent.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    /// Puts `replacement` where `original` sits in the hierarchy: same
    /// parent slot, same local transform, and `original`'s children moved
    /// under it. `original` and its remaining components are removed.
    pub fn splice_replace(&mut self, original: NodeHandle, replacement: NodeHandle) {
        if original == replacement
            || !self.nodes.contains_key(original)
            || !self.nodes.contains_key(replacement)
        {
            return;
        }

        let transform = self.nodes[original].transform.clone();
        let parent = self.nodes[original].parent;

        // Unlink the replacement and take over the original's slot
        self.detach(replacement);
        match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p].children;
                if let Some(slot) = siblings.iter().position(|&x| x == original) {
                    siblings[slot] = replacement;
                }
            }
            None => {
                if let Some(slot) = self.root_nodes.iter().position(|&x| x == original) {
                    self.root_nodes[slot] = replacement;
                }
            }
        }

        let children = std::mem::take(&mut self.nodes[original].children);
        for &child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(replacement);
                node.transform.mark_dirty();
            }
        }

        let node = &mut self.nodes[replacement];
        node.parent = parent;
        node.transform.copy_trs_from(&transform);
        node.children.extend(children);

        // The original is now isolated
        self.nodes[original].parent = None;
        self.names.remove(original);
        self.meshes.remove(original);
        self.skins.remove(original);
        self.nodes.remove(original);
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) {
        if self.nodes.contains_key(handle) {
            self.meshes.insert(handle, mesh);
        }
    }

    #[must_use]
    pub fn get_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn set_skin(&mut self, handle: NodeHandle, skin: SkinBinding) {
        if self.nodes.contains_key(handle) {
            self.skins.insert(handle, skin);
        }
    }

    #[must_use]
    pub fn get_skin(&self, handle: NodeHandle) -> Option<&SkinBinding> {
        self.skins.get(handle)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeleton_pool.insert(skeleton)
    }

    #[must_use]
    pub fn get_skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skeleton_pool.get(key)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Lazily walks the subtree rooted at `root`, depth-first.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Descendants<'_> {
        Descendants::new(&self.nodes, root)
    }

    /// First node under `root` (inclusive) whose name matches exactly.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.descendants(root)
            .find(|&handle| self.get_name(handle) == Some(name))
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Updates world matrices of the whole scene.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    /// Updates world matrices of one subtree only.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    /// Recomputes joint matrices for every skinned node.
    pub fn update_skeletons(&mut self) {
        let tasks: Vec<(SkeletonKey, Affine3A)> = self
            .skins
            .iter()
            .filter_map(|(handle, binding)| {
                let node = self.nodes.get(handle)?;
                let root_inv = match binding.bind_mode {
                    BindMode::Attached => node.transform.world_matrix.inverse(),
                    BindMode::Detached => binding.bind_matrix_inv,
                };
                Some((binding.skeleton, root_inv))
            })
            .collect();

        let nodes = &self.nodes;
        for (skeleton_key, root_inv) in tasks {
            if let Some(skeleton) = self.skeleton_pool.get_mut(skeleton_key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }

    /// Per-frame update: world matrices, then joint matrices.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }
}
