//! WGPU-based rendering backend
//!
//! Owns the surface, device and queue, and draws [`DrawList`]s either to the
//! window surface or to an offscreen texture for image export.

use image::RgbaImage;

use super::backend::RenderBackend;
use super::draw_list::DrawList;
use super::mesh_pipeline::{InstanceRaw, MeshCache, MeshPipeline};
use crate::error::EngineError;
use crate::gfx::resources::{GlobalBindings, GlobalUBO, TextureResource};
use crate::wgpu_utils::InstanceBuffer;

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Depth buffer handling
/// - Global uniform updates
/// - Offscreen capture with CPU readback
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    surface_pipeline: MeshPipeline,
    capture_pipeline: Option<MeshPipeline>,
    mesh_cache: MeshCache,
    instances: InstanceBuffer<InstanceRaw>,
    format: wgpu::TextureFormat,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    ///
    /// # Errors
    /// Fails if no surface, adapter or device can be obtained.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, EngineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::debug!("using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(EngineError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(
            &device,
            config.width,
            config.height,
            "depth_texture",
        );

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let surface_pipeline = MeshPipeline::new(&device, format, &global_bindings);
        // one instance per tile plus room furniture
        let instances = InstanceBuffer::new(&device, 512);

        log::debug!("render engine ready: {}x{} {:?}", config.width, config.height, format);

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            global_ubo,
            global_bindings,
            surface_pipeline,
            capture_pipeline: None,
            mesh_cache: MeshCache::new(),
            instances,
            format,
        })
    }

    /// Uploads uniforms, missing meshes and per-item instances for `frame`.
    fn prepare(&mut self, frame: &DrawList<'_>) {
        self.global_ubo.update_content(&self.queue, frame.globals);
        self.mesh_cache
            .prepare(&self.device, frame.meshes, &frame.items);
        let raw: Vec<InstanceRaw> = frame.items.iter().map(InstanceRaw::from_item).collect();
        self.instances.upload(&self.device, &self.queue, &raw);
    }

    /// Returns reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns reference to the wgpu command queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_scene_pass(
    encoder: &mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    pipeline: &MeshPipeline,
    globals: &GlobalBindings,
    cache: &MeshCache,
    instances: &InstanceBuffer<InstanceRaw>,
    frame: &DrawList<'_>,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Scene Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(frame.clear_wgpu_color()),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    pipeline.draw(&mut pass, globals, cache, instances, frame);
}

impl RenderBackend for RenderEngine {
    fn render(&mut self, frame: &DrawList<'_>) -> Result<(), EngineError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface {error}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.prepare(frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        encode_scene_pass(
            &mut encoder,
            &surface_view,
            &self.depth_texture.view,
            &self.surface_pipeline,
            &self.global_bindings,
            &self.mesh_cache,
            &self.instances,
            frame,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and recreates the depth buffer
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, width, height, "depth_texture");
    }

    fn capture(&mut self, frame: &DrawList<'_>) -> Result<RgbaImage, EngineError> {
        let (width, height) = self.surface_size();

        let target = TextureResource::create_capture_target(&self.device, width, height);
        let depth =
            TextureResource::create_depth_texture(&self.device, width, height, "capture_depth");
        self.prepare(frame);
        let pipeline = self.capture_pipeline.get_or_insert_with(|| {
            MeshPipeline::new(
                &self.device,
                TextureResource::CAPTURE_FORMAT,
                &self.global_bindings,
            )
        });

        let bytes_per_pixel = 4u32;
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        encode_scene_pass(
            &mut encoder,
            &target.view,
            &depth.view,
            pipeline,
            &self.global_bindings,
            &self.mesh_cache,
            &self.instances,
            frame,
        );
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = output_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| EngineError::Capture(e.to_string()))?;

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(EngineError::Capture(e.to_string())),
            Err(_) => return Err(EngineError::Capture("readback callback dropped".into())),
        }

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            pixels.extend_from_slice(&mapped[start..start + unpadded_bytes_per_row as usize]);
        }
        drop(mapped);
        output_buffer.unmap();

        log::debug!("captured {width}x{height} frame");
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| EngineError::Capture("pixel buffer size mismatch".into()))
    }

    /// Returns current surface dimensions as (width, height) in pixels
    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
