use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Maps raw mouse input onto orbit and zoom.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
        }
    }

    /// Tracks the left button from window input; drags orbit while it is held.
    pub fn process_mouse_input(&mut self, button: MouseButton, state: ElementState) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        self.is_mouse_pressed = state == ElementState::Pressed;
        true
    }

    /// Returns true when the camera was touched.
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::MouseWheel { delta } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 40.0,
                };
                // wheel up zooms in
                camera.zoom((1.0 + self.zoom_speed).powf(-scroll));
                true
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                camera.rotate(
                    -delta.0 as f32 * self.rotate_speed,
                    -delta.1 as f32 * self.rotate_speed,
                );
                true
            }
            _ => false,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.01, 0.1)
    }
}
