//! Playback controller.
//!
//! A `Stopped → Playing ⇄ Paused` state machine that advances clip time on
//! every host tick and writes sampled bone deltas on top of the bind pose.

use std::sync::Arc;

use kinema_scene::{NodeHandle, Scene};
use serde::Serialize;

use crate::binder::{BoundSkeleton, InitialPoseTable};
use crate::binding::{PropertyBinding, TargetPath};
use crate::clip::{AnimationClip, TrackData};
use crate::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

/// Snapshot of the controller for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub state: PlaybackStatus,
    pub speed: f32,
    pub current_time: f32,
    pub duration: f32,
}

/// Emitted by every tick that advanced time, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub current_time: f32,
    /// `current_time / duration`, 0 for zero-length clips
    pub progress: f32,
    /// Time wrapped around the clip end (or start, when playing backwards)
    pub looped: bool,
    pub loop_count: u32,
}

pub struct AnimationController {
    clip: Arc<AnimationClip>,

    asset_root: NodeHandle,
    bones: Vec<NodeHandle>,
    initial_pose: Arc<InitialPoseTable>,

    bindings: Vec<PropertyBinding>,
    cursors: Vec<KeyframeCursor>,

    status: PlaybackStatus,
    speed: f32,
    time: f32,
    loop_count: u32,

    detached: bool,
}

impl AnimationController {
    /// Binds every track whose bone name exists in `skeleton`. Tracks for
    /// unmatched bones are dropped; their bones never move.
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, skeleton: &BoundSkeleton) -> Self {
        let bindings: Vec<PropertyBinding> = clip
            .tracks
            .iter()
            .enumerate()
            .filter_map(|(track_index, track)| {
                let bone_index = skeleton.bone_index(&track.meta.node_name)?;
                Some(PropertyBinding {
                    track_index,
                    bone_index,
                    node: *skeleton.bones.get(bone_index)?,
                    target: track.meta.target,
                })
            })
            .collect();

        log::debug!(
            "Controller for '{}': {}/{} tracks bound",
            clip.name,
            bindings.len(),
            clip.tracks.len()
        );

        Self {
            cursors: vec![KeyframeCursor::default(); clip.tracks.len()],
            clip,
            asset_root: skeleton.asset_root,
            bones: skeleton.bones.clone(),
            initial_pose: Arc::clone(&skeleton.initial_pose),
            bindings,
            status: PlaybackStatus::Stopped,
            speed: 1.0,
            time: 0.0,
            loop_count: 0,
            detached: false,
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            state: self.status,
            speed: self.speed,
            current_time: self.time,
            duration: self.clip.duration,
        }
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.clip.duration > 0.0 {
            self.time / self.clip.duration
        } else {
            0.0
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn play(&mut self) {
        if self.status != PlaybackStatus::Playing {
            log::debug!("'{}': {:?} -> Playing", self.clip.name, self.status);
            self.status = PlaybackStatus::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            log::debug!("'{}': Playing -> Paused", self.clip.name);
            self.status = PlaybackStatus::Paused;
        }
    }

    /// Any state → Stopped, bind pose restored, time rewound to 0.
    pub fn stop(&mut self, scene: &mut Scene) {
        self.status = PlaybackStatus::Stopped;
        self.loop_count = 0;
        self.reset(scene);
    }

    /// Restores the bind pose and rewinds to 0 without changing state.
    pub fn reset(&mut self, scene: &mut Scene) {
        self.time = 0.0;
        for cursor in &mut self.cursors {
            cursor.last_index = 0;
        }
        if self.detached {
            return;
        }
        self.initial_pose.restore(scene, &self.bones);
        scene.update_subtree(self.asset_root);
    }

    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.speed = speed;
        } else {
            log::warn!("Ignoring non-finite playback speed {speed}");
        }
    }

    /// Seeks to `time mod duration` and evaluates the pose immediately,
    /// whatever the current state.
    pub fn set_time(&mut self, time: f32, scene: &mut Scene) {
        if !time.is_finite() {
            log::warn!("Ignoring non-finite seek time {time}");
            return;
        }
        self.time = wrap_time(time, self.clip.duration);
        self.evaluate(scene);
    }

    /// Stops writing to the scene for good. Used when this controller is
    /// superseded by a new clip.
    pub fn detach(&mut self) {
        self.detached = true;
        self.status = PlaybackStatus::Stopped;
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Advances time by `dt * speed` (looping) and applies the pose.
    /// Does nothing unless Playing.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> Option<TickReport> {
        if self.detached || self.status != PlaybackStatus::Playing {
            return None;
        }

        let duration = self.clip.duration;
        let mut looped = false;
        if duration > 0.0 {
            let raw = self.time + dt * self.speed;
            if raw >= duration || raw < 0.0 {
                looped = true;
                self.loop_count = self.loop_count.wrapping_add(1);
            }
            self.time = wrap_time(raw, duration);
        }

        self.evaluate(scene);

        Some(TickReport {
            current_time: self.time,
            progress: self.progress(),
            looped,
            loop_count: self.loop_count,
        })
    }

    /// Samples every bound track at the current time and writes
    /// `bind ∘ delta` into the bone nodes.
    fn evaluate(&mut self, scene: &mut Scene) {
        if self.detached {
            return;
        }

        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(bind) = self.initial_pose.get(binding.bone_index) else {
                continue;
            };
            let Some(node) = scene.get_node_mut(binding.node) else {
                continue;
            };
            let cursor = &mut self.cursors[binding.track_index];

            match (&track.data, binding.target) {
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    if let Some(delta) = t.sample_with_cursor(self.time, cursor) {
                        node.transform.position = bind.position + delta;
                    }
                }
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    if let Some(delta) = t.sample_with_cursor(self.time, cursor) {
                        node.transform.rotation = bind.rotation * delta;
                    }
                }
                _ => {}
            }
        }

        scene.update_subtree(self.asset_root);
    }
}

/// Euclidean wrap into `[0, duration)`; zero-length clips pin time to 0.
fn wrap_time(time: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if wrapped >= duration { 0.0 } else { wrapped }
}
