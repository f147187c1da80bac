//! Reference-pose normalization.
//!
//! Motion captures are layered onto whatever bind pose the target rig has,
//! so absolute samples are rewritten relative to frame 0.

use glam::Vec3;
use rustc_hash::FxHashMap;

use kinema_core::{Error, Result};

use crate::motion::{BoneSample, Frame};

/// Position/rotation pair captured for one bone in the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseSample {
    pub position: Vec3,
    /// XYZ Euler, degrees
    pub rotation: Vec3,
}

/// `bone id → pose` captured once from `frames[0]`.
#[derive(Debug, Clone, Default)]
pub struct ReferencePose {
    bones: FxHashMap<i32, PoseSample>,
}

impl ReferencePose {
    #[must_use]
    pub fn from_frame(frame: &Frame) -> Self {
        let bones = frame
            .samples
            .iter()
            .map(|s| {
                (
                    s.bone_id,
                    PoseSample {
                        position: s.position,
                        rotation: s.rotation,
                    },
                )
            })
            .collect();
        Self { bones }
    }

    #[must_use]
    pub fn get(&self, bone_id: i32) -> Option<&PoseSample> {
        self.bones.get(&bone_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Subtracts the reference values of the sample's bone. Bones without a
    /// reference entry subtract zero.
    #[must_use]
    pub fn delta(&self, sample: &BoneSample) -> BoneSample {
        let reference = self.get(sample.bone_id).copied().unwrap_or_default();
        BoneSample {
            bone_id: sample.bone_id,
            position: sample.position - reference.position,
            rotation: sample.rotation - reference.rotation,
        }
    }
}

/// A frame whose samples are relative to the [`ReferencePose`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaFrame {
    pub time: u32,
    pub samples: Vec<BoneSample>,
}

/// Captures the reference pose from `frames[0]` and produces one
/// [`DeltaFrame`] per input frame (frame 0 included).
pub fn normalize(frames: &[Frame]) -> Result<(ReferencePose, Vec<DeltaFrame>)> {
    let first = frames.first().ok_or(Error::EmptyAnimation)?;
    let reference = ReferencePose::from_frame(first);

    let deltas = frames
        .iter()
        .map(|frame| DeltaFrame {
            time: frame.time,
            samples: frame.samples.iter().map(|s| reference.delta(s)).collect(),
        })
        .collect();

    Ok((reference, deltas))
}
