use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::engine::HeatmapEngine;
use crate::error::Result;
use crate::field::{dominant_source, FieldParams, TileDataset};
use crate::gfx::camera::ViewMode;
use crate::gfx::picking::PointerEvent;
use crate::gfx::rendering::{RenderBackend, RenderEngine};

const WINDOW_TITLE: &str = "Bacteria Heatmap";

/// Desktop host for the heatmap engine.
///
/// Keys: `1`/`2`/`3` switch to top, isometric and walk views, `R` resets,
/// `P` exports a PNG, `Esc` quits.
pub struct SpotmapApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    engine: Option<HeatmapEngine<RenderEngine>>,
    config: ViewerConfig,
    dataset: Arc<TileDataset>,
    started: Instant,
    cursor: Option<PhysicalPosition<f64>>,
}

impl SpotmapApp {
    /// Generates the dataset for `config` and prepares the event loop.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let dataset = Arc::new(config.generate_dataset(&FieldParams::now()));

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                engine: None,
                config,
                dataset,
                started: Instant::now(),
                cursor: None,
            },
        })
    }

    /// Runs until the window closes.
    pub fn run(mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        if let Some(engine) = self.app_state.engine.as_mut() {
            engine.dispose();
        }
        Ok(())
    }
}

impl AppState {
    fn create_engine(&mut self, window: Arc<Window>) -> Result<HeatmapEngine<RenderEngine>> {
        let (width, height) = window.inner_size().into();
        let renderer = pollster::block_on(RenderEngine::new(window, width, height))?;

        let size = renderer.surface_size();
        let mut engine = HeatmapEngine::new(renderer, self.dataset.clone(), &self.config, size)?;

        engine.on_hover(|record, _pointer| {
            log::debug!(
                "{} {}: {:.0} CFU/cm², {}",
                record.key,
                record.spot_name,
                record.total_load,
                record.severity
            );
        });
        let hotspots = self.config.hotspots.clone();
        engine.on_select(move |record| {
            log::info!(
                "selected {} {}: {:.0} CFU/cm² ({}), last cleaned {}. {}",
                record.key,
                record.spot_name,
                record.total_load,
                record.severity,
                record.last_cleaned,
                record.recommendation()
            );
            if let Some(source) = dominant_source(record, &hotspots) {
                log::info!("dominant source: {source}");
            }
        });
        Ok(engine)
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        if key_code == KeyCode::Escape {
            event_loop.exit();
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match key_code {
            KeyCode::Digit1 => engine.set_view_mode(ViewMode::Top),
            KeyCode::Digit2 => engine.set_view_mode(ViewMode::Iso),
            KeyCode::Digit3 => engine.set_view_mode(ViewMode::Walk),
            KeyCode::KeyR => engine.reset(),
            KeyCode::KeyP => {
                if let Err(err) = engine.save_image(&self.config.export_dir) {
                    log::error!("export failed: {err}");
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.config.window_size;
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match self.create_engine(window.clone()) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.window = Some(window);
            }
            Err(err) => {
                log::error!("failed to start renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(width, height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
                if let Some(engine) = self.engine.as_mut() {
                    engine.pointer_move(PointerEvent::new(position.x as f32, position.y as f32));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                engine.handle_mouse_button(button, state);
                if let (MouseButton::Left, ElementState::Pressed, Some(position)) =
                    (button, state, self.cursor)
                {
                    engine.pointer_click(PointerEvent::new(position.x as f32, position.y as f32));
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };
                if let Err(err) = engine.frame(self.started.elapsed()) {
                    log::error!("frame failed: {err}");
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(engine) = self.engine.as_mut() {
            engine.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
