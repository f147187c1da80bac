//! Track synthesis: delta frames → keyframe tracks.

use std::sync::Arc;

use glam::{EulerRot, Quat, Vec3};
use serde::Serialize;

use kinema_core::Result;

use crate::binding::TargetPath;
use crate::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::motion::{BoneDeclaration, MotionFile};
use crate::normalize::{DeltaFrame, ReferencePose, normalize};
use crate::settings::ImportSettings;
use crate::tracks::KeyframeTrack;

/// Converts stored XYZ Euler degrees into a unit quaternion (`qx * qy * qz`).
#[must_use]
pub fn euler_degrees_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        rotation.x.to_radians(),
        rotation.y.to_radians(),
        rotation.z.to_radians(),
    )
}

/// Builds one translation and one rotation track per bone that has at
/// least one sample. Frames without a sample for a bone are skipped, so
/// sparsely sampled bones get fewer keyframes.
#[must_use]
pub fn synthesize_clip(
    name: &str,
    bones: &[BoneDeclaration],
    frames: &[DeltaFrame],
    settings: &ImportSettings,
) -> AnimationClip {
    let sample_rate = settings.effective_sample_rate();
    let mut tracks = Vec::with_capacity(bones.len() * 2);

    for bone in bones {
        let mut times = Vec::new();
        let mut positions = Vec::new();
        let mut rotations = Vec::new();

        for frame in frames {
            let Some(sample) = frame.samples.iter().find(|s| s.bone_id == bone.id) else {
                continue;
            };
            times.push(frame.time as f32 / sample_rate);
            positions.push(sample.position * settings.position_scale);
            rotations.push(euler_degrees_to_quat(sample.rotation));
        }

        if times.is_empty() {
            continue;
        }

        tracks.push(Track {
            meta: TrackMeta {
                node_name: bone.name.clone(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                times.clone(),
                positions,
                settings.interpolation,
            )),
        });
        tracks.push(Track {
            meta: TrackMeta {
                node_name: bone.name.clone(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(KeyframeTrack::new(times, rotations, settings.interpolation)),
        });
    }

    AnimationClip::new(name.to_string(), tracks)
}

/// Read-only summary of the loaded animation for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationInfo {
    pub name: String,
    pub duration_seconds: f32,
    pub frame_count: usize,
    pub bone_count: usize,
}

/// Result of running a parsed motion through normalization and synthesis.
#[derive(Debug, Clone)]
pub struct ImportedMotion {
    pub clip: Arc<AnimationClip>,
    pub info: AnimationInfo,
    pub bones: Vec<BoneDeclaration>,
    pub reference_pose: ReferencePose,
}

/// Normalizer + synthesizer in one step.
pub fn import_motion(motion: &MotionFile, settings: &ImportSettings) -> Result<ImportedMotion> {
    let (reference_pose, deltas) = normalize(&motion.frames)?;
    let clip = synthesize_clip(&motion.name, &motion.bones, &deltas, settings);

    let info = AnimationInfo {
        name: motion.name.clone(),
        duration_seconds: clip.duration,
        frame_count: motion.frame_count(),
        bone_count: motion.bone_count(),
    };

    log::debug!(
        "Imported '{}': {} tracks, {:.3}s",
        info.name,
        clip.tracks.len(),
        info.duration_seconds
    );

    Ok(ImportedMotion {
        clip: Arc::new(clip),
        info,
        bones: motion.bones.clone(),
        reference_pose,
    })
}
