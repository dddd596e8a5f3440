//! Heatmap engine lifecycle.
//!
//! [`HeatmapEngine`] ties the scene, camera, picking and frame loop to a
//! [`RenderBackend`]. Every public method is safe to call after
//! [`HeatmapEngine::dispose`]; they become no-ops, and image export reports
//! [`EngineError::Disposed`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use winit::event::{DeviceEvent, ElementState, MouseButton};

use crate::config::ViewerConfig;
use crate::error::{EngineError, Result};
use crate::field::{CalendarDate, TileDataset, TileRecord};
use crate::frame::{compose_frame, spin_rings, FrameLoop};
use crate::gfx::camera::{CameraController, OrbitCamera, ViewMode};
use crate::gfx::picking::{PickResult, PickState, PickingController, PointerEvent};
use crate::gfx::rendering::RenderBackend;
use crate::gfx::scene::{SceneBuilder, SceneHandle};

/// File name used for exported heatmap images.
pub fn export_file_name(date: CalendarDate) -> String {
    format!("bacteria-heatmap-{date}.png")
}

pub struct HeatmapEngine<B: RenderBackend> {
    backend: Option<B>,
    scene: SceneHandle,
    camera: OrbitCamera,
    controller: CameraController,
    picking: PickingController,
    frame_loop: FrameLoop,
    viewport: (u32, u32),
    last_frame_time: Duration,
}

impl<B: RenderBackend> HeatmapEngine<B> {
    /// Builds the scene and camera and schedules the first frame.
    ///
    /// A zero `size` falls back to the backend's surface size.
    pub fn new(
        backend: B,
        dataset: Arc<TileDataset>,
        config: &ViewerConfig,
        size: (u32, u32),
    ) -> Result<Self> {
        let scene = SceneBuilder::new(config.room)
            .walls(config.walls)
            .build(dataset)?;

        let viewport = if size.0 == 0 || size.1 == 0 {
            backend.surface_size()
        } else {
            size
        };
        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        let camera = OrbitCamera::new(config.room, aspect);

        let mut frame_loop = FrameLoop::new();
        frame_loop.request();

        log::info!(
            "heatmap engine ready: {} tiles, viewport {}x{}",
            scene.tiles().len(),
            viewport.0,
            viewport.1
        );

        Ok(Self {
            backend: Some(backend),
            scene,
            camera,
            controller: CameraController::default(),
            picking: PickingController::new(),
            frame_loop,
            viewport,
            last_frame_time: Duration::ZERO,
        })
    }

    pub fn on_hover(&mut self, callback: impl FnMut(&TileRecord, &PointerEvent) + 'static) {
        self.picking.set_on_hover(callback);
    }

    pub fn on_clear_hover(&mut self, callback: impl FnMut() + 'static) {
        self.picking.set_on_clear_hover(callback);
    }

    pub fn on_select(&mut self, callback: impl FnMut(&TileRecord) + 'static) {
        self.picking.set_on_select(callback);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> Option<PickResult> {
        if self.is_disposed() {
            return None;
        }
        self.picking
            .pointer_move(&mut self.scene, &self.camera, self.viewport, &event)
    }

    pub fn pointer_click(&mut self, event: PointerEvent) -> Option<PickResult> {
        if self.is_disposed() {
            return None;
        }
        self.picking
            .pointer_click(&mut self.scene, &mut self.camera, self.viewport, &event)
    }

    /// Starts or ends an orbit drag from a window mouse button.
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.controller.process_mouse_input(button, state)
    }

    /// Feeds raw mouse input to the orbit controls.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.controller.process_events(event, &mut self.camera)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.is_disposed() {
            return;
        }
        self.camera.set_mode(mode);
        log::info!("view mode: {mode}");
    }

    pub fn view_mode(&self) -> ViewMode {
        self.camera.mode()
    }

    /// Back to the isometric view with nothing selected.
    pub fn reset(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.camera.set_mode(ViewMode::Iso);
        self.picking.clear_selection(&mut self.scene);
        log::info!("view reset");
    }

    /// Updates camera aspect and backend surface. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.is_disposed() || width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.resize_projection(width, height);
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
    }

    /// Runs one frame if one is pending. Returns whether a frame was drawn.
    pub fn frame(&mut self, now: Duration) -> Result<bool> {
        if !self.frame_loop.begin_frame() {
            return Ok(false);
        }
        let Some(backend) = self.backend.as_mut() else {
            return Ok(false);
        };

        self.last_frame_time = now;
        self.camera.update();
        spin_rings(&mut self.scene);

        let list = compose_frame(&self.scene, &self.picking.state(), &self.camera, now);
        let result = backend.render(&list);
        self.frame_loop.request();
        result.map(|()| true)
    }

    /// Renders the current view offscreen.
    pub fn export_image(&mut self) -> Result<RgbaImage> {
        let backend = self.backend.as_mut().ok_or(EngineError::Disposed)?;
        let list = compose_frame(
            &self.scene,
            &self.picking.state(),
            &self.camera,
            self.last_frame_time,
        );
        backend.capture(&list)
    }

    /// Writes the current view to `dir` as a dated PNG and returns its path.
    pub fn save_image(&mut self, dir: &Path) -> Result<PathBuf> {
        let image = self.export_image()?;
        std::fs::create_dir_all(dir).map_err(|source| EngineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(export_file_name(CalendarDate::today()));
        image.save(&path)?;
        log::info!("exported heatmap to {}", path.display());
        Ok(path)
    }

    /// Cancels the pending frame, then releases the backend.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.frame_loop.dispose();
        self.backend = None;
        log::info!("heatmap engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.frame_loop.is_disposed()
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn pick_state(&self) -> PickState {
        self.picking.state()
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_name_carries_the_date() {
        let date = CalendarDate::from_ymd(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "bacteria-heatmap-2024-03-07.png");
    }
}
