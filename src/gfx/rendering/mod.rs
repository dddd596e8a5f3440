// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Frames are described by a [`DrawList`] and handed to a [`RenderBackend`];
//! [`RenderEngine`] is the wgpu implementation.

pub mod backend;
pub mod draw_list;
pub mod mesh_pipeline;
pub mod render_engine;

// Re-export main types
pub use backend::RenderBackend;
pub use draw_list::{DrawItem, DrawList};
pub use render_engine::RenderEngine;
