//! Seam between the engine and whatever turns a [`DrawList`] into pixels.

use image::RgbaImage;

use super::draw_list::DrawList;
use crate::error::EngineError;

pub trait RenderBackend {
    /// Draws and presents one frame.
    fn render(&mut self, frame: &DrawList<'_>) -> Result<(), EngineError>;

    /// Resizes the presentation surface. Zero sizes are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Draws `frame` offscreen at surface size and reads it back.
    fn capture(&mut self, frame: &DrawList<'_>) -> Result<RgbaImage, EngineError>;

    fn surface_size(&self) -> (u32, u32);
}
