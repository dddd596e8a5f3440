//! Backend-neutral description of one frame.

use cgmath::Matrix4;

use crate::field::Rgb;
use crate::gfx::geometry::Topology;
use crate::gfx::resources::GlobalUniform;
use crate::gfx::scene::{MeshId, MeshLibrary, NodeId, RenderLayer};

/// One node ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub label: &'static str,
    pub mesh: MeshId,
    pub topology: Topology,
    pub layer: RenderLayer,
    pub model: Matrix4<f32>,
    /// Base colour with opacity in alpha.
    pub color: [f32; 4],
    pub emissive: [f32; 3],
    pub unlit: bool,
}

impl DrawItem {
    pub fn is_transparent(&self) -> bool {
        self.color[3] < 1.0
    }

    pub fn world_position(&self) -> [f32; 3] {
        [self.model.w.x, self.model.w.y, self.model.w.z]
    }
}

/// Everything a backend needs to produce one image.
#[derive(Debug, Clone)]
pub struct DrawList<'a> {
    pub meshes: &'a MeshLibrary,
    pub globals: GlobalUniform,
    pub clear_color: Rgb,
    /// Already in submission order.
    pub items: Vec<DrawItem>,
}

impl DrawList<'_> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_labelled<'s>(&'s self, label: &'s str) -> impl Iterator<Item = &'s DrawItem> + 's {
        self.items.iter().filter(move |item| item.label == label)
    }

    pub fn clear_wgpu_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color.to_array();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}
