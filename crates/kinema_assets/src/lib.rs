//! # Kinema Assets
//!
//! Fetching motion files and owning the one active clip of a preview.
//!
//! - [`AssetReader`] / [`FileAssetReader`]: byte sources
//! - [`MotionLoader`]: read → parse → import, async or blocking
//! - [`PreviewSession`]: the single owner of scene, skeleton and controller;
//!   discards superseded loads by generation number

pub mod io;
pub mod loader;
pub mod session;

pub use io::{AssetReader, FileAssetReader};
pub use loader::{LoadedMotion, MotionLoader};
pub use session::PreviewSession;
