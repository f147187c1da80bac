use glam::{Affine3A, Mat4};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::{Node, NodeHandle, SkeletonKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Bones follow node movement (the usual character skinning case).
    /// The mesh node's current world inverse is used each frame.
    Attached,
    /// Bones are detached from the mesh node; the inverse recorded at
    /// bind time is used instead.
    Detached,
}

/// How the mesh's vertices are weighted onto the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinWeights {
    /// Per-vertex weights authored with the asset.
    Authored,
    /// No weights exist; every vertex follows the root bone rigidly.
    RigidRoot,
}

/// Skin component: binds a mesh node to a skeleton.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
    pub bind_mode: BindMode,
    /// Inverse world matrix of the mesh node at bind time (Detached mode)
    pub bind_matrix_inv: Affine3A,
    pub weights: SkinWeights,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // bones[i] corresponds to joint i
    pub bones: Vec<NodeHandle>,

    // Mesh space -> bone local space, one per bone
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    pub(crate) root_bone_index: usize,

    // Recomputed every frame from the bones' world matrices
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        let count = bones.len();

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    /// Builds a skeleton whose inverse bind matrices are the inverses of
    /// the bones' current world matrices. The hierarchy must have been
    /// updated before calling this.
    #[must_use]
    pub fn from_bind_pose(
        name: &str,
        bones: Vec<NodeHandle>,
        nodes: &SlotMap<NodeHandle, Node>,
        root_bone_index: usize,
    ) -> Self {
        let inverse_bind_matrices = bones
            .iter()
            .map(|&bone| {
                nodes
                    .get(bone)
                    .map_or(Affine3A::IDENTITY, |node| node.transform.world_matrix.inverse())
            })
            .collect();

        Self::new(name, bones, inverse_bind_matrices, root_bone_index)
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Updates the joint matrices.
    ///
    /// * `nodes`: node storage, read for each bone's world matrix
    /// * `root_matrix_inv`: inverse world matrix of the skinned mesh node,
    ///   bringing bone transforms back into mesh local space
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let ibm = self.inverse_bind_matrices[i];
            self.joint_matrices[i] = (root_matrix_inv * bone_node.transform.world_matrix * ibm).into();
        }
    }
}
