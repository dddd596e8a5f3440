//! Global uniform bindings for camera and scene lighting
//!
//! Manages the uniform buffer and bind group for per-frame state shared by
//! every draw: camera matrices, the ambient plus three directional lights, and
//! linear fog.

use bytemuck::{Pod, Zeroable};
use cgmath::InnerSpace;

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        scene::{Fog, LightRig},
    },
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Global uniform buffer content.
///
/// MUST match the `GlobalUniform` struct in the mesh shader exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Ambient colour pre-multiplied by intensity.
    pub ambient: [f32; 4],
    /// Unit vectors pointing from the scene towards each light.
    pub light_directions: [[f32; 4]; 3],
    /// Light colours pre-multiplied by intensity.
    pub light_colors: [[f32; 4]; 3],
    pub fog_color: [f32; 4],
    /// x = near, y = far
    pub fog_range: [f32; 4],
}
// 16 + 64 + 16 + 48 + 48 + 16 + 16 = 224 bytes

impl GlobalUniform {
    pub fn new(camera: CameraUniform, lights: &LightRig, fog: &Fog) -> Self {
        let scaled = |color: [f32; 3], intensity: f32| {
            [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0]
        };

        let mut light_directions = [[0.0; 4]; 3];
        let mut light_colors = [[0.0; 4]; 3];
        for (i, light) in lights.directional.iter().enumerate() {
            let direction = light.position.normalize();
            light_directions[i] = [direction.x, direction.y, direction.z, 0.0];
            light_colors[i] = scaled(light.color.to_array(), light.intensity);
        }

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: scaled(lights.ambient_color.to_array(), lights.ambient_intensity),
            light_directions,
            light_colors,
            fog_color: fog.color.with_alpha(1.0),
            fog_range: [fog.near, fog.far, 0.0, 0.0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Bind group for [`GlobalUBO`], bound to slot 0 in every pipeline.
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[binding_types::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
