//! Skeleton binding.
//!
//! Finds the skeleton of a loaded asset, or synthesizes one from the
//! motion's bone declarations when the asset is a plain static mesh, and
//! snapshots the bind pose every reset restores.

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde::Serialize;

use kinema_scene::{
    BindMode, Mesh, NodeHandle, Scene, SkeletonKey, Skeleton, SkinBinding, SkinWeights,
};

use crate::motion::BoneDeclaration;

/// Non-fatal conditions collected while binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// A motion bone has no same-named bone in the target skeleton.
    UnmatchedBone { name: String },
    /// The asset had no skeleton; one was synthesized and the mesh is
    /// rigidly bound to its root bone.
    SynthesizedSkeleton { bone_count: usize },
    /// The asset had neither skeleton nor mesh; synthesized bones move
    /// nothing visible.
    NoMeshToSkin,
    /// The motion declares no bones, so there is nothing to bind.
    EmptySkeleton,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnmatchedBone { name } => {
                write!(f, "Bone '{name}' not found in target skeleton; it will not move")
            }
            Warning::SynthesizedSkeleton { bone_count } => write!(
                f,
                "Asset has no skeleton; synthesized {bone_count} bones. \
                 Without skin weights the mesh follows the root bone rigidly"
            ),
            Warning::NoMeshToSkin => write!(f, "Asset has no mesh to bind the synthesized skeleton to"),
            Warning::EmptySkeleton => write!(f, "Motion declares no bones"),
        }
    }
}

/// Local transform of one bone in the bind pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// `bone index → bind-pose local transform`, captured once per bound
/// skeleton before any playback.
#[derive(Debug, Clone, Default)]
pub struct InitialPoseTable {
    poses: Vec<BonePose>,
}

impl InitialPoseTable {
    /// Snapshots the current local transform of each bone, in order.
    #[must_use]
    pub fn capture(scene: &Scene, bones: &[NodeHandle]) -> Self {
        let poses = bones
            .iter()
            .map(|&bone| {
                scene.get_node(bone).map_or(
                    BonePose {
                        position: Vec3::ZERO,
                        rotation: Quat::IDENTITY,
                        scale: Vec3::ONE,
                    },
                    |node| BonePose {
                        position: node.transform.position,
                        rotation: node.transform.rotation,
                        scale: node.transform.scale,
                    },
                )
            })
            .collect();
        Self { poses }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bone_index: usize) -> Option<&BonePose> {
        self.poses.get(bone_index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Writes every snapshotted transform back onto its bone node.
    pub fn restore(&self, scene: &mut Scene, bones: &[NodeHandle]) {
        for (pose, &bone) in self.poses.iter().zip(bones) {
            if let Some(node) = scene.get_node_mut(bone) {
                node.transform.position = pose.position;
                node.transform.rotation = pose.rotation;
                node.transform.scale = pose.scale;
                node.transform.mark_dirty();
            }
        }
    }
}

/// A skeleton bound to an asset, with its name lookup and bind pose.
#[derive(Debug, Clone)]
pub struct BoundSkeleton {
    /// Root of the asset subtree. Differs from the handle passed to
    /// [`SkeletonBinder::bind`] when the root itself was the spliced mesh.
    pub asset_root: NodeHandle,
    pub skeleton: SkeletonKey,
    /// Bone nodes in skeleton order.
    pub bones: Vec<NodeHandle>,
    /// Bone name → index into `bones`.
    pub bone_map: FxHashMap<String, usize>,
    pub initial_pose: Arc<InitialPoseTable>,
    /// The skinned mesh node, if any.
    pub skinned_mesh: Option<NodeHandle>,
    pub synthesized: bool,
    pub warnings: Vec<Warning>,
}

impl BoundSkeleton {
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_map.get(name).copied()
    }

    #[must_use]
    pub fn node_for(&self, name: &str) -> Option<NodeHandle> {
        self.bone_index(name).and_then(|i| self.bones.get(i).copied())
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Matches motion bone names against this skeleton (case-sensitive,
    /// exact). Returns one warning per unmatched name.
    #[must_use]
    pub fn match_bones(&self, declarations: &[BoneDeclaration]) -> Vec<Warning> {
        let warnings: Vec<Warning> = declarations
            .iter()
            .filter(|decl| !self.bone_map.contains_key(&decl.name))
            .map(|decl| Warning::UnmatchedBone {
                name: decl.name.clone(),
            })
            .collect();

        if !warnings.is_empty() {
            log::warn!(
                "{} of {} motion bones have no match in the target skeleton",
                warnings.len(),
                declarations.len()
            );
        }
        warnings
    }

    /// Restores the bind pose and refreshes world matrices of the asset.
    pub fn restore_bind_pose(&self, scene: &mut Scene) {
        self.initial_pose.restore(scene, &self.bones);
        scene.update_subtree(self.asset_root);
    }
}

pub struct SkeletonBinder;

impl SkeletonBinder {
    /// Binds the motion's bones onto the asset under `asset_root`.
    ///
    /// Uses the first skinned mesh found in the subtree; if there is none,
    /// a skeleton is synthesized from `declarations`.
    pub fn bind(scene: &mut Scene, asset_root: NodeHandle, declarations: &[BoneDeclaration]) -> BoundSkeleton {
        let existing = scene.descendants(asset_root).find_map(|handle| {
            let skin = scene.get_skin(handle)?;
            scene
                .get_skeleton(skin.skeleton)
                .map(|skeleton| (handle, skin.skeleton, skeleton.bones.clone()))
        });

        match existing {
            Some((mesh_node, skeleton, bones)) => {
                Self::bind_existing(scene, asset_root, mesh_node, skeleton, bones, declarations)
            }
            None => Self::synthesize(scene, asset_root, declarations),
        }
    }

    fn bind_existing(
        scene: &mut Scene,
        asset_root: NodeHandle,
        mesh_node: NodeHandle,
        skeleton: SkeletonKey,
        bones: Vec<NodeHandle>,
        declarations: &[BoneDeclaration],
    ) -> BoundSkeleton {
        let mut bone_map = FxHashMap::default();
        for (index, &bone) in bones.iter().enumerate() {
            if let Some(name) = scene.get_name(bone) {
                bone_map.entry(name.to_string()).or_insert(index);
            }
        }

        let initial_pose = Arc::new(InitialPoseTable::capture(scene, &bones));

        let mut bound = BoundSkeleton {
            asset_root,
            skeleton,
            bones,
            bone_map,
            initial_pose,
            skinned_mesh: Some(mesh_node),
            synthesized: false,
            warnings: Vec::new(),
        };
        bound.warnings = bound.match_bones(declarations);

        log::info!(
            "Bound motion to existing skeleton: {} bones, {} unmatched",
            bound.bone_count(),
            bound.warnings.len()
        );
        bound
    }

    fn synthesize(scene: &mut Scene, asset_root: NodeHandle, declarations: &[BoneDeclaration]) -> BoundSkeleton {
        let mut warnings = Vec::new();
        let mut asset_root = asset_root;

        // One node per declaration, wired after all exist so declaration
        // order does not matter.
        let bones: Vec<NodeHandle> = declarations
            .iter()
            .map(|decl| scene.create_node_with_name(&decl.name))
            .collect();
        let by_id: FxHashMap<i32, NodeHandle> = declarations
            .iter()
            .zip(&bones)
            .map(|(decl, &node)| (decl.id, node))
            .collect();

        let mut root_bones = Vec::new();
        for (decl, &node) in declarations.iter().zip(&bones) {
            match by_id.get(&decl.parent_id) {
                Some(&parent) if !decl.is_root() => scene.attach(node, parent),
                _ => root_bones.push(node),
            }
        }

        let first_mesh = scene
            .descendants(asset_root)
            .find(|&handle| scene.get_mesh(handle).is_some());

        let skinned_mesh = match first_mesh.and_then(|h| scene.get_mesh(h).cloned().map(|m| (h, m))) {
            Some((original, mesh)) => {
                let skinned = Self::splice_skinned_mesh(scene, original, mesh);
                if original == asset_root {
                    asset_root = skinned;
                }
                for &root in &root_bones {
                    scene.attach(root, skinned);
                }
                Some(skinned)
            }
            None => {
                for &root in &root_bones {
                    scene.attach(root, asset_root);
                }
                warnings.push(Warning::NoMeshToSkin);
                None
            }
        };

        scene.update_matrix_world();

        let root_bone_index = declarations.iter().position(BoneDeclaration::is_root).unwrap_or(0);
        let skeleton = Skeleton::from_bind_pose("SynthesizedSkeleton", bones.clone(), &scene.nodes, root_bone_index);
        let skeleton = scene.add_skeleton(skeleton);

        if let Some(mesh_node) = skinned_mesh {
            let bind_matrix_inv = scene
                .get_node(mesh_node)
                .map(|node| node.world_matrix().inverse())
                .unwrap_or_default();
            scene.set_skin(
                mesh_node,
                SkinBinding {
                    skeleton,
                    bind_mode: BindMode::Attached,
                    bind_matrix_inv,
                    weights: SkinWeights::RigidRoot,
                },
            );
        }

        if declarations.is_empty() {
            warnings.push(Warning::EmptySkeleton);
        } else {
            warnings.push(Warning::SynthesizedSkeleton {
                bone_count: bones.len(),
            });
        }
        for warning in &warnings {
            log::warn!("{warning}");
        }

        let bone_map = declarations
            .iter()
            .enumerate()
            .map(|(index, decl)| (decl.name.clone(), index))
            .collect();
        let initial_pose = Arc::new(InitialPoseTable::capture(scene, &bones));

        BoundSkeleton {
            asset_root,
            skeleton,
            bones,
            bone_map,
            initial_pose,
            skinned_mesh,
            synthesized: true,
            warnings,
        }
    }

    /// Wraps `mesh`'s geometry and material in a new node that takes the
    /// original mesh node's place in the hierarchy.
    fn splice_skinned_mesh(scene: &mut Scene, original: NodeHandle, mesh: Mesh) -> NodeHandle {
        let name = scene.get_name(original).unwrap_or("SkinnedMesh").to_string();
        let skinned = scene.create_node_with_name(&name);
        scene.set_mesh(skinned, mesh);
        scene.splice_replace(original, skinned);
        skinned
    }
}
