use kinema_scene::NodeHandle;
use serde::{Deserialize, Serialize};

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPath {
    Translation, // transform.position
    Rotation,    // transform.rotation
}

/// Maps track `track_index` of a clip onto bone `bone_index` of a bound
/// skeleton, whose scene node is `node`.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub bone_index: usize,
    pub node: NodeHandle,
    pub target: TargetPath,
}
