// src/lib.rs
//! Spotmap
//!
//! A 3D surface-contamination heatmap viewer built on wgpu and winit.
//! Synthetic tile data is generated in [`field`], laid out as a room in
//! [`gfx::scene`] and driven by a [`HeatmapEngine`].

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod frame;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::SpotmapApp;
pub use config::ViewerConfig;
pub use engine::HeatmapEngine;
pub use error::{ConfigError, EngineError};
