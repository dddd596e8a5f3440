//! # Graphics Module
//!
//! Everything between the tile dataset and pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - Node arena holding the room, tiles and selection rings
//! - **Geometry** ([`geometry`]) - Procedural boxes, planes, grids and rings
//! - **Camera System** ([`camera`]) - Orbit camera with preset view modes
//! - **Picking** ([`picking`]) - Ray casting from pointer position to tiles
//! - **Rendering Pipeline** ([`rendering`]) - Draw lists and the wgpu backend
//! - **Resource Management** ([`resources`]) - Global uniforms, depth and capture textures
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use spotmap::field::{generate_seeded, FieldParams, RoomDims, DEFAULT_HOTSPOTS};
//! use spotmap::gfx::{scene::SceneBuilder, OrbitCamera};
//!
//! let dims = RoomDims::new(20, 15).unwrap();
//! let data = generate_seeded(dims, &DEFAULT_HOTSPOTS, &FieldParams::now(), 7);
//! let scene = SceneBuilder::new(dims).build(Arc::new(data)).unwrap();
//! let camera = OrbitCamera::new(dims, 1.5);
//! ```

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
