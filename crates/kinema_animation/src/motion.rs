use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parent id used by root bones.
pub const ROOT_PARENT: i32 = -1;

/// One entry of a motion file's `nodes` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneDeclaration {
    pub id: i32,
    pub name: String,
    /// `ROOT_PARENT` (-1) for roots
    pub parent_id: i32,
}

impl BoneDeclaration {
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

/// A bone's local position and XYZ Euler rotation (degrees) in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneSample {
    pub bone_id: i32,
    pub position: Vec3,
    pub rotation: Vec3,
}

/// All samples recorded at one frame index. Bones may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: u32,
    pub samples: Vec<BoneSample>,
}

impl Frame {
    #[must_use]
    pub fn sample(&self, bone_id: i32) -> Option<&BoneSample> {
        self.samples.iter().find(|s| s.bone_id == bone_id)
    }
}

/// A parsed motion file. Immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionFile {
    pub name: String,
    pub version: u32,
    pub bones: Vec<BoneDeclaration>,
    pub frames: Vec<Frame>,
}

impl MotionFile {
    #[must_use]
    pub fn bone(&self, id: i32) -> Option<&BoneDeclaration> {
        self.bones.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&BoneDeclaration> {
        self.bones.iter().find(|b| b.name == name)
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
