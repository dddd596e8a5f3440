//! Room scene construction.
//!
//! [`SceneBuilder::build`] turns a [`TileDataset`] into a [`SceneHandle`]:
//! floor, walls, grid overlay, lighting and one pickable quad per tile.
//! Tile quads are created once here; afterwards only their emissive colour,
//! lift and selection ring change.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Vector3;

use super::arena::{Material, Node, NodeArena, NodeId, RenderLayer, Transform};
use super::mesh::{MeshId, MeshLibrary};
use crate::error::ConfigError;
use crate::field::{color_for, RoomDims, Rgb, TileDataset, TileKey, TileRecord, TILE_SIZE};
use crate::gfx::geometry::{generate_box, generate_grid_lines, generate_plane, generate_ring};

pub const TILE_EXTENT: f32 = TILE_SIZE * 0.95;
pub const TILE_OPACITY: f32 = 0.8;
pub const TILE_REST_Y: f32 = 0.01;
pub const HOVER_LIFT_Y: f32 = 0.05;
pub const SELECT_LIFT_Y: f32 = 0.08;
pub const HOVER_EMISSIVE: Rgb = Rgb::from_hex(0x444444);
pub const SELECT_EMISSIVE: Rgb = Rgb::from_hex(0x06b6d4);
/// Share of a tile's base colour it emits while at rest.
pub const REST_EMISSIVE_SCALE: f32 = 0.1;

pub const RING_INNER_RADIUS: f32 = 0.6;
pub const RING_OUTER_RADIUS: f32 = 0.7;
pub const RING_SEGMENTS: u32 = 32;
pub const RING_OFFSET_Y: f32 = 0.02;
pub const RING_OPACITY: f32 = 0.6;
pub const RING_COLOR: Rgb = Rgb::from_hex(0x06b6d4);

pub const FLOOR_COLOR: Rgb = Rgb::from_hex(0x0f172a);
pub const WALL_COLOR: Rgb = Rgb::from_hex(0x1e293b);
pub const WALL_HEIGHT: f32 = 4.0;
pub const WALL_THICKNESS: f32 = 0.2;
pub const GRID_CENTER_COLOR: Rgb = Rgb::from_hex(0x1e293b);
pub const GRID_LINE_COLOR: Rgb = Rgb::from_hex(0x334155);
pub const BACKGROUND_COLOR: Rgb = Rgb::from_hex(0x0a0e27);

/// Which sides of the room get a wall slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallLayout {
    /// Back, left and right walls; the front (high-z) side stays open.
    #[default]
    ThreeSided,
    Enclosed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    /// Light travels from this point towards the origin.
    pub position: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub directional: [DirectionalLight; 3],
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: Rgb::from_hex(0x404040),
            ambient_intensity: 0.4,
            directional: [
                // main
                DirectionalLight {
                    color: Rgb::from_hex(0xffffff),
                    intensity: 0.8,
                    position: Vector3::new(20.0, 30.0, 20.0),
                },
                // fill
                DirectionalLight {
                    color: Rgb::from_hex(0x06b6d4),
                    intensity: 0.3,
                    position: Vector3::new(-10.0, 20.0, -10.0),
                },
                // rim
                DirectionalLight {
                    color: Rgb::from_hex(0x10b981),
                    intensity: 0.2,
                    position: Vector3::new(0.0, 10.0, -20.0),
                },
            ],
        }
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: BACKGROUND_COLOR,
            near: 10.0,
            far: 100.0,
        }
    }
}

/// Visual state applied to a tile quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileVisual {
    Rest,
    Hover,
    Selected,
}

/// Scene-side handle of one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileNode {
    pub key: TileKey,
    pub node: NodeId,
    pub base_color: Rgb,
    /// Selection ring attached to this tile, if any.
    pub decoration: Option<NodeId>,
}

impl TileNode {
    pub fn rest_emissive(&self) -> [f32; 3] {
        rest_emissive(self.base_color)
    }
}

fn rest_emissive(base: Rgb) -> [f32; 3] {
    base.to_array().map(|c| c * REST_EMISSIVE_SCALE)
}

/// Builds a [`SceneHandle`] for a room.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    dims: RoomDims,
    walls: WallLayout,
}

impl SceneBuilder {
    pub fn new(dims: RoomDims) -> Self {
        Self {
            dims,
            walls: WallLayout::default(),
        }
    }

    pub fn walls(mut self, walls: WallLayout) -> Self {
        self.walls = walls;
        self
    }

    /// Populates the scene. Fails if any tile of the room has no record.
    pub fn build(&self, dataset: Arc<TileDataset>) -> Result<SceneHandle, ConfigError> {
        let dims = self.dims;
        let (cx, cz) = dims.centroid();
        let (width, depth) = (dims.width() as f32, dims.height() as f32);

        let mut meshes = MeshLibrary::new();
        let floor_mesh = meshes.add("floor", generate_plane(width + 2.0, depth + 2.0));
        let tile_mesh = meshes.add("tile", generate_plane(TILE_EXTENT, TILE_EXTENT));
        let ring_mesh = meshes.add(
            "selection_ring",
            generate_ring(RING_INNER_RADIUS, RING_OUTER_RADIUS, RING_SEGMENTS),
        );
        let grid_size = width.max(depth);
        let grid_mesh = meshes.add(
            "grid",
            generate_grid_lines(
                grid_size,
                grid_size as u32,
                GRID_CENTER_COLOR.to_array(),
                GRID_LINE_COLOR.to_array(),
            ),
        );

        let mut arena = NodeArena::new();
        let floor = arena.insert(
            Node::new(
                "floor",
                floor_mesh,
                Transform::at(cx, -0.01, cz),
                Material::lit(FLOOR_COLOR, 0.8),
            )
            .on_layer(RenderLayer::Ground),
        );

        let mut tiles = Vec::with_capacity(dims.tile_count());
        let mut tile_index = HashMap::with_capacity(dims.tile_count());
        for key in dims.keys() {
            let record = dataset.require(&key)?;
            let base_color = color_for(record.total_load);
            let node = arena.insert(
                Node::new(
                    "tile",
                    tile_mesh,
                    Transform::at(key.x as f32, TILE_REST_Y, key.y as f32),
                    Material::lit(base_color, TILE_OPACITY)
                        .with_emissive(rest_emissive(base_color)),
                )
                .pickable(),
            );
            tile_index.insert(key, tiles.len());
            tiles.push(TileNode {
                key,
                node,
                base_color,
                decoration: None,
            });
        }

        let walls = self.build_walls(&mut meshes, &mut arena);

        // grid sits between the floor and the tiles
        let grid = arena.insert(
            Node::new(
                "grid",
                grid_mesh,
                Transform::at(cx, 0.005, cz),
                Material::unlit(Rgb::from_hex(0xffffff), 1.0),
            )
            .on_layer(RenderLayer::Overlay),
        );

        log::debug!(
            "built scene: {} tiles, {} walls, {} nodes, {} meshes",
            tiles.len(),
            walls.len(),
            arena.len(),
            meshes.len()
        );

        Ok(SceneHandle {
            dims,
            dataset,
            arena,
            meshes,
            tiles,
            tile_index,
            floor,
            walls,
            grid,
            ring_mesh,
            lights: LightRig::default(),
            fog: Fog::default(),
            background: BACKGROUND_COLOR,
        })
    }

    fn build_walls(&self, meshes: &mut MeshLibrary, arena: &mut NodeArena) -> Vec<NodeId> {
        let (cx, cz) = self.dims.centroid();
        let (width, depth) = (self.dims.width() as f32, self.dims.height() as f32);
        let half_thickness = WALL_THICKNESS / 2.0;
        let y = WALL_HEIGHT / 2.0;

        let long = meshes.add(
            "wall_long",
            generate_box(width + WALL_THICKNESS, WALL_HEIGHT, WALL_THICKNESS),
        );
        let short = meshes.add("wall_short", generate_box(depth, WALL_HEIGHT, WALL_THICKNESS));

        let mut slabs = vec![
            (long, Transform::at(cx, y, -half_thickness)),
            (
                short,
                Transform::at(-half_thickness, y, cz).with_rotation_y(std::f32::consts::FRAC_PI_2),
            ),
            (
                short,
                Transform::at(width - 1.0 + half_thickness, y, cz)
                    .with_rotation_y(std::f32::consts::FRAC_PI_2),
            ),
        ];
        if self.walls == WallLayout::Enclosed {
            slabs.push((long, Transform::at(cx, y, depth - 1.0 + half_thickness)));
        }

        slabs
            .into_iter()
            .map(|(mesh, transform)| {
                arena.insert(Node::new("wall", mesh, transform, Material::lit(WALL_COLOR, 0.8)))
            })
            .collect()
    }
}

/// Everything drawn for one room.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    dims: RoomDims,
    dataset: Arc<TileDataset>,
    pub arena: NodeArena,
    pub meshes: MeshLibrary,
    tiles: Vec<TileNode>,
    tile_index: HashMap<TileKey, usize>,
    pub floor: NodeId,
    pub walls: Vec<NodeId>,
    pub grid: NodeId,
    ring_mesh: MeshId,
    pub lights: LightRig,
    pub fog: Fog,
    pub background: Rgb,
}

impl SceneHandle {
    pub fn dims(&self) -> RoomDims {
        self.dims
    }

    pub fn dataset(&self) -> &Arc<TileDataset> {
        &self.dataset
    }

    pub fn tiles(&self) -> &[TileNode] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&TileNode> {
        self.tiles.get(index)
    }

    pub fn tile_index(&self, key: &TileKey) -> Option<usize> {
        self.tile_index.get(key).copied()
    }

    pub fn record(&self, key: &TileKey) -> Option<&TileRecord> {
        self.dataset.get(key)
    }

    /// World-space centre of a tile quad at its current lift.
    pub fn tile_position(&self, index: usize) -> Option<Vector3<f32>> {
        let tile = self.tiles.get(index)?;
        self.arena.get(tile.node).map(|node| node.transform.translation)
    }

    /// Sets emissive tint and lift for a tile.
    pub fn apply_tile_visual(&mut self, index: usize, visual: TileVisual) {
        let Some(tile) = self.tiles.get(index) else {
            return;
        };
        let (emissive, lift) = match visual {
            TileVisual::Rest => (tile.rest_emissive(), TILE_REST_Y),
            TileVisual::Hover => (HOVER_EMISSIVE.to_array(), HOVER_LIFT_Y),
            TileVisual::Selected => (SELECT_EMISSIVE.to_array(), SELECT_LIFT_Y),
        };
        if let Some(node) = self.arena.get_mut(tile.node) {
            node.material.emissive = emissive;
            node.transform.translation.y = lift;
        }
    }

    /// Attaches the selection ring to a tile. A tile never carries more than one ring.
    pub fn attach_ring(&mut self, index: usize) -> Option<NodeId> {
        let tile = self.tiles.get(index)?;
        if let Some(ring) = tile.decoration.filter(|ring| self.arena.contains(*ring)) {
            return Some(ring);
        }

        let ring = self.arena.insert(
            Node::new(
                "selection_ring",
                self.ring_mesh,
                Transform::at(0.0, RING_OFFSET_Y, 0.0),
                Material::unlit(RING_COLOR, RING_OPACITY),
            )
            .child_of(tile.node)
            .on_layer(RenderLayer::Decoration),
        );
        self.tiles[index].decoration = Some(ring);
        Some(ring)
    }

    /// Removes the selection ring from a tile, if it has one.
    pub fn detach_ring(&mut self, index: usize) {
        if let Some(ring) = self.tiles.get_mut(index).and_then(|tile| tile.decoration.take()) {
            self.arena.remove(ring);
        }
    }

    /// Number of selection rings currently in the arena.
    pub fn ring_count(&self) -> usize {
        self.arena
            .iter()
            .filter(|(_, node)| node.mesh == self.ring_mesh)
            .count()
    }
}
