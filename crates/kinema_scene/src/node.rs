use glam::Affine3A;
use smallvec::SmallVec;

use crate::NodeHandle;
use crate::transform::Transform;

/// A minimal scene node containing only hierarchy and transform.
///
/// Names, meshes and skin bindings live in the [`Scene`](crate::Scene)'s
/// sparse component maps so nodes stay small.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node handle (None for root nodes)
    pub parent: Option<NodeHandle>,
    /// Child node handles
    pub children: SmallVec<[NodeHandle; 4]>,

    pub transform: Transform,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
            visible: true,
        }
    }

    #[must_use]
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last hierarchy update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
