//! # Kinema Scene
//!
//! The scene graph an asset loader hands to the animation engine.
//!
//! - [`Node`]: hierarchy links plus a [`Transform`]
//! - [`Scene`]: node storage with sparse component maps (names, meshes, skins)
//! - [`Skeleton`]: ordered bone list with inverse bind matrices
//! - [`Descendants`]: lazy depth-first walk over a subtree
//!
//! The engine never parses the asset's native format; it only reads and
//! rewires what is stored here.

pub mod mesh;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;
pub mod traverse;

pub use mesh::Mesh;
pub use node::Node;
pub use scene::Scene;
pub use skeleton::{BindMode, SkinBinding, SkinWeights, Skeleton};
pub use transform::Transform;
pub use traverse::Descendants;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node stored in a [`Scene`].
    pub struct NodeHandle;
    /// Handle to a skeleton stored in a [`Scene`].
    pub struct SkeletonKey;
    /// Opaque handle to geometry owned by the host's asset storage.
    pub struct GeometryHandle;
    /// Opaque handle to a material owned by the host's asset storage.
    pub struct MaterialHandle;
}
