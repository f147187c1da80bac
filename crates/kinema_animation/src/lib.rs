//! # Kinema Animation
//!
//! The motion import and playback pipeline:
//!
//! 1. [`format`]: motion-file text → [`MotionFile`]
//! 2. [`normalize`]: absolute samples → deltas against frame 0
//! 3. [`synthesis`]: deltas → time-sampled [`AnimationClip`] tracks
//! 4. [`binder`]: asset scene graph → [`BoundSkeleton`] (found or synthesized)
//! 5. [`controller`]: per-tick evaluation with play/pause/stop/seek/speed
//!
//! ```rust,ignore
//! let motion = parse_motion(&text)?;
//! let imported = import_motion(&motion, &ImportSettings::default())?;
//! let bound = SkeletonBinder::bind(&mut scene, asset_root, &imported.bones);
//! let mut controller = AnimationController::new(imported.clip, &bound);
//! controller.play();
//! controller.tick(dt, &mut scene);
//! ```

pub mod binder;
pub mod binding;
pub mod clip;
pub mod controller;
pub mod format;
pub mod motion;
pub mod normalize;
pub mod settings;
pub mod synthesis;
pub mod tracks;
pub mod values;

pub use binder::{BonePose, BoundSkeleton, InitialPoseTable, SkeletonBinder, Warning};
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use controller::{AnimationController, PlaybackState, PlaybackStatus, TickReport};
pub use format::{parse_motion, write_motion};
pub use motion::{BoneDeclaration, BoneSample, Frame, MotionFile};
pub use normalize::{DeltaFrame, PoseSample, ReferencePose, normalize};
pub use settings::ImportSettings;
pub use synthesis::{AnimationInfo, ImportedMotion, import_motion, synthesize_clip};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
