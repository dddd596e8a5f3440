//! CPU-side mesh storage shared by scene nodes.

use crate::gfx::geometry::GeometryData;

/// Index into a [`MeshLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Geometry registered once and referenced by any number of nodes.
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: Vec<(&'static str, GeometryData)>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &'static str, geometry: GeometryData) -> MeshId {
        self.meshes.push((name, geometry));
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&GeometryData> {
        self.meshes.get(id.0).map(|(_, geometry)| geometry)
    }

    pub fn name(&self, id: MeshId) -> Option<&'static str> {
        self.meshes.get(id.0).map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
