//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::{Affine3A, Quat, Vec3};
use slotmap::SlotMap;

use kinema::scene::{
    BindMode, GeometryHandle, MaterialHandle, Mesh, Node, NodeHandle, Scene, SkeletonKey, Skeleton, SkinBinding,
    SkinWeights, Transform,
};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

/// Quaternions q and -q describe the same rotation.
pub fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

/// Two bones, two frames. Bone 0 moves +1 on Z, bone 1 turns 90° about X.
pub const WAVE: &str = r#"
version 1
// name: wave
nodes
  0 "pelvis" -1
  1 "spine" 0
end
skeleton
  time 0
    0 0.0 0.0 0.0 0.0 0.0 0.0
    1 0.0 1.0 0.0 0.0 0.0 0.0
  time 1
    0 0.0 0.0 1.0 0.0 0.0 0.0
    1 0.0 1.0 0.0 1.5707963 0.0 0.0
end
"#;

/// Three bones over four frames, no name comment.
pub const WALK: &str = "
version 2
nodes
  0 root -1
  1 hip 0
  2 knee 1
end
skeleton
  time 0
    0 0 0 0 0 0 0
    1 0 1 0 0 0 0
    2 0 -1 0 0 0 0
  time 1
    0 0.1 0 0 0 0 0
    1 0 1 0 0.1 0 0
    2 0 -1 0 0.2 0 0
  time 2
    0 0.2 0 0 0 0 0
    1 0 1 0 0.2 0 0
    2 0 -1 0 0.4 0 0
  time 3
    0 0.3 0 0 0 0 0
    1 0 1 0 0.3 0 0
    2 0 -1 0 0.6 0 0
end
";

/// Host-owned geometry and material storage, standing in for a renderer.
pub struct MeshStore {
    pub geometries: SlotMap<GeometryHandle, ()>,
    pub materials: SlotMap<MaterialHandle, ()>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self {
            geometries: SlotMap::with_key(),
            materials: SlotMap::with_key(),
        }
    }

    pub fn mesh(&mut self, name: &str) -> Mesh {
        Mesh::new(self.geometries.insert(()), self.materials.insert(())).with_name(name)
    }
}

/// A static-mesh asset: `Asset` root with a single `Body` mesh child.
pub fn static_mesh_asset(store: &mut MeshStore) -> (Scene, NodeHandle, NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Asset");
    let body = scene.create_node_with_name("Body");
    scene.set_mesh(body, store.mesh("Body"));
    scene.attach(body, root);
    scene.update_matrix_world();
    (scene, root, body)
}

/// Handles of the rigged fixture.
pub struct Rig {
    pub root: NodeHandle,
    pub body: NodeHandle,
    pub pelvis: NodeHandle,
    pub spine: NodeHandle,
    pub skeleton: SkeletonKey,
}

pub const PELVIS_BIND: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const SPINE_BIND: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// A skinned character whose bones are named like the `WAVE` motion, with
/// a non-trivial bind pose (spine turned 90° about Y).
pub fn rigged_asset(store: &mut MeshStore) -> (Scene, Rig) {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Character");

    let body = scene.create_node_with_name("Body");
    scene.set_mesh(body, store.mesh("Body"));
    scene.attach(body, root);

    let pelvis = scene.add_node(Node::with_transform(Transform::from_trs(PELVIS_BIND, Quat::IDENTITY, Vec3::ONE)));
    scene.set_name(pelvis, "pelvis");
    scene.attach(pelvis, root);

    let spine_rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let spine = scene.add_node(Node::with_transform(Transform::from_trs(SPINE_BIND, spine_rotation, Vec3::ONE)));
    scene.set_name(spine, "spine");
    scene.attach(spine, pelvis);

    scene.update_matrix_world();

    let skeleton = Skeleton::from_bind_pose("Rig", vec![pelvis, spine], &scene.nodes, 0);
    let skeleton = scene.add_skeleton(skeleton);
    scene.set_skin(
        body,
        SkinBinding {
            skeleton,
            bind_mode: BindMode::Attached,
            bind_matrix_inv: Affine3A::IDENTITY,
            weights: SkinWeights::Authored,
        },
    );

    (
        scene,
        Rig {
            root,
            body,
            pelvis,
            spine,
            skeleton,
        },
    )
}
