//! Error types for the heatmap viewer
//!
//! Configuration problems are reported through [`ConfigError`] and surface at
//! construction time. Everything the engine can fail with at runtime is an
//! [`EngineError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::field::TileKey;

/// Invalid or incomplete configuration. Never recovered by substituting defaults.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid room dimensions {width}x{height}: both sides must be positive")]
    InvalidRoomDimensions { width: i64, height: i64 },

    #[error("dataset has no record for tile {0}")]
    MissingTile(TileKey),

    #[error("malformed tile key {0:?}, expected \"x_y\"")]
    MalformedTileKey(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidEnvValue { key: &'static str, value: String },
}

/// Failures raised by the engine and its rendering backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter available: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("engine has been disposed")]
    Disposed,
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
