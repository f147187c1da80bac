use crate::{GeometryHandle, MaterialHandle};

/// Mesh component: a geometry/material pair attached to a node.
///
/// The vertex data itself is owned by the host's asset storage; the scene
/// only carries handles, so wrapping a mesh in a new skinned node shares
/// the original geometry rather than copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub visible: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}
