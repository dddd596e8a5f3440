//! # Scene Management Module
//!
//! The room scene is a flat arena of nodes. Tiles, walls, floor and grid are
//! root nodes; the selection ring is the only child node and hangs off the
//! tile it decorates.
//!
//! ## Key Components
//!
//! - [`SceneBuilder`] - Populates a [`SceneHandle`] from a tile dataset
//! - [`NodeArena`] - Generational slot storage for nodes
//! - [`MeshLibrary`] - Geometry shared by nodes
//! - [`Vertex3D`] - GPU vertex layout
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use spotmap::field::{generate_seeded, FieldParams, RoomDims, DEFAULT_HOTSPOTS};
//! use spotmap::gfx::scene::SceneBuilder;
//!
//! let dims = RoomDims::default();
//! let dataset = Arc::new(generate_seeded(dims, &DEFAULT_HOTSPOTS, &FieldParams::now(), 1));
//! let scene = SceneBuilder::new(dims).build(dataset).unwrap();
//! assert_eq!(scene.tiles().len(), 300);
//! ```

pub mod arena;
pub mod builder;
pub mod mesh;
pub mod vertex;

pub use arena::{Material, Node, NodeArena, NodeId, RenderLayer, Transform};
pub use builder::{
    DirectionalLight, Fog, LightRig, SceneBuilder, SceneHandle, TileNode, TileVisual, WallLayout,
};
pub use mesh::{MeshId, MeshLibrary};
pub use vertex::Vertex3D;
