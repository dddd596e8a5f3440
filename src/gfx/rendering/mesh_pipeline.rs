//! Mesh rendering
//!
//! Every node is drawn as one instance of its mesh: the instance carries the
//! world matrix, colour and emissive term, so a frame is one instance-buffer
//! upload followed by one draw call per node. Two pipelines share the shader,
//! one for triangle meshes and one for the grid's line list.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, RenderPass, RenderPipeline};

use super::draw_list::{DrawItem, DrawList};
use crate::gfx::geometry::Topology;
use crate::gfx::resources::{GlobalBindings, TextureResource};
use crate::gfx::scene::{MeshId, MeshLibrary, Vertex3D};
use crate::wgpu_utils::InstanceBuffer;

/// Per-node instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb = emissive, w = 1 for unlit
    pub emissive: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];

    pub fn from_item(item: &DrawItem) -> Self {
        let [r, g, b] = item.emissive;
        Self {
            model: item.model.into(),
            color: item.color,
            emissive: [r, g, b, if item.unlit { 1.0 } else { 0.0 }],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

/// GPU copies of [`MeshLibrary`] entries, uploaded on first use.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshId, GpuMesh>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads any mesh referenced by `items` that is not resident yet.
    pub fn prepare(&mut self, device: &Device, library: &MeshLibrary, items: &[DrawItem]) {
        for item in items {
            if self.meshes.contains_key(&item.mesh) {
                continue;
            }
            let Some(geometry) = library.get(item.mesh) else {
                log::warn!("draw item '{}' references unknown mesh {:?}", item.label, item.mesh);
                continue;
            };
            let name = library.name(item.mesh).unwrap_or("mesh");
            let (vertices, indices) = geometry.to_scene_format();

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Vertex Buffer")),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Index Buffer")),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            log::debug!("uploaded mesh '{name}': {} vertices", vertices.len());
            self.meshes.insert(
                item.mesh,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Triangle and line pipelines for one colour target format.
pub struct MeshPipeline {
    triangles: RenderPipeline,
    lines: RenderPipeline,
}

impl MeshPipeline {
    pub fn new(
        device: &Device,
        color_format: wgpu::TextureFormat,
        globals: &GlobalBindings,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[globals.bind_group_layout()],
            push_constant_ranges: &[],
        });

        let build = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc(), InstanceRaw::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // tiles and floor are single-sided quads
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: TextureResource::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        Self {
            triangles: build("Mesh Triangle Pipeline", wgpu::PrimitiveTopology::TriangleList),
            lines: build("Mesh Line Pipeline", wgpu::PrimitiveTopology::LineList),
        }
    }

    /// Records draw calls for every item of `frame`. `instances` must already
    /// hold one [`InstanceRaw`] per item, in item order.
    pub fn draw<'a>(
        &'a self,
        pass: &mut RenderPass<'a>,
        globals: &'a GlobalBindings,
        cache: &'a MeshCache,
        instances: &'a InstanceBuffer<InstanceRaw>,
        frame: &DrawList<'_>,
    ) {
        if instances.is_empty() {
            return;
        }
        if instances.len() < frame.len() {
            log::warn!("instance buffer holds {} of {} items", instances.len(), frame.len());
            return;
        }

        pass.set_bind_group(0, globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, instances.buffer().slice(..));

        let mut current: Option<Topology> = None;
        for (index, item) in frame.items.iter().enumerate() {
            let Some(mesh) = cache.meshes.get(&item.mesh) else {
                continue;
            };
            if current != Some(item.topology) {
                pass.set_pipeline(match item.topology {
                    Topology::Triangles => &self.triangles,
                    Topology::Lines => &self.lines,
                });
                current = Some(item.topology);
            }

            let instance = index as u32;
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
        }
    }
}

const MESH_SHADER: &str = r#"
struct GlobalUniform {
    view_position: vec4<f32>,
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    light_directions: array<vec4<f32>, 3>,
    light_colors: array<vec4<f32>, 3>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
}

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
    @location(8) emissive: vec4<f32>, // w = unlit
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) emissive: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> global: GlobalUniform;

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_position = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);

    return VertexOutput(
        global.view_proj * world_position,
        world_position.xyz,
        world_normal,
        vec4<f32>(instance.color.rgb * vertex.color, instance.color.a),
        instance.emissive,
    );
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.emissive.w > 0.5) {
        return in.color;
    }

    let normal = normalize(in.world_normal);
    var light = global.ambient.rgb;
    for (var i = 0u; i < 3u; i = i + 1u) {
        let ndotl = max(dot(normal, global.light_directions[i].xyz), 0.0);
        light = light + global.light_colors[i].rgb * ndotl;
    }
    var rgb = in.color.rgb * light + in.emissive.rgb;

    let distance_to_eye = distance(global.view_position.xyz, in.world_position);
    let fog_span = max(global.fog_range.y - global.fog_range.x, 0.0001);
    let fog = clamp((distance_to_eye - global.fog_range.x) / fog_span, 0.0, 1.0);
    rgb = mix(rgb, global.fog_color.rgb, fog);

    return vec4<f32>(rgb, in.color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Rgb;
    use crate::gfx::scene::RenderLayer;
    use cgmath::{Matrix4, SquareMatrix};

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
        let last = InstanceRaw::ATTRIBUTES[5];
        assert_eq!(last.offset, 80);
        assert_eq!(last.shader_location, 8);
    }

    #[test]
    fn unlit_flag_travels_in_emissive_w() {
        let mut arena = crate::gfx::scene::NodeArena::new();
        let node = arena.insert(crate::gfx::scene::Node::new(
            "ring",
            MeshId(0),
            Default::default(),
            crate::gfx::scene::Material::unlit(Rgb::from_hex(0x06b6d4), 0.6),
        ));
        let item = DrawItem {
            node,
            label: "ring",
            mesh: MeshId(0),
            topology: Topology::Triangles,
            layer: RenderLayer::Decoration,
            model: Matrix4::identity(),
            color: [0.0, 0.7, 0.8, 0.6],
            emissive: [0.1, 0.2, 0.3],
            unlit: true,
        };
        let raw = InstanceRaw::from_item(&item);
        assert_eq!(raw.emissive, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(raw.color[3], 0.6);
        assert_eq!(raw.model[3][3], 1.0);
    }
}
