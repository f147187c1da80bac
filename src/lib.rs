//! # Kinema
//!
//! Imports text motion files and retargets them onto the skeleton of a
//! previewed 3D asset.
//!
//! This crate re-exports the workspace members under short module names:
//!
//! - [`errors`]: error types
//! - [`scene`]: the scene graph the binder works on
//! - [`animation`]: parse, normalize, synthesize, bind, play
//! - [`assets`]: file loading and the [`PreviewSession`]

pub use kinema_animation as animation;
pub use kinema_assets as assets;
pub use kinema_core as errors;
pub use kinema_scene as scene;

pub use kinema_animation::{
    AnimationClip, AnimationController, AnimationInfo, BoundSkeleton, ImportSettings, MotionFile,
    PlaybackState, PlaybackStatus, SkeletonBinder, TickReport, Warning, import_motion, parse_motion,
};
pub use kinema_assets::{FileAssetReader, LoadedMotion, MotionLoader, PreviewSession};
pub use kinema_core::{Error, FormatError, LoadError, Result};
pub use kinema_scene::{Node, NodeHandle, Scene};
