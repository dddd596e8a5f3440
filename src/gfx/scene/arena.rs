//! Arena of renderable nodes.
//!
//! Nodes are addressed by [`NodeId`], an index plus a generation counter, so
//! an id that outlives its node resolves to `None` instead of a recycled slot.
//! Parent links point upwards only; detaching a child is a slot clear.

use cgmath::{Matrix4, Rad, Vector3};

use super::mesh::MeshId;
use crate::field::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Translation, XYZ Euler rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation_y(mut self, angle: f32) -> Self {
        self.rotation.y = angle;
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Surface appearance of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    /// Added on top of the lit colour, channels in `0.0..=1.0`.
    pub emissive: [f32; 3],
    pub opacity: f32,
    /// Skip lighting and fog shading.
    pub unlit: bool,
}

impl Material {
    pub fn lit(color: Rgb, opacity: f32) -> Self {
        Self {
            color,
            emissive: [0.0; 3],
            opacity,
            unlit: false,
        }
    }

    pub fn unlit(color: Rgb, opacity: f32) -> Self {
        Self {
            unlit: true,
            ..Self::lit(color, opacity)
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }
}

/// Draw ordering bucket. Lower layers are drawn first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RenderLayer {
    Ground,
    Overlay,
    #[default]
    Scene,
    Decoration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: &'static str,
    pub mesh: MeshId,
    pub transform: Transform,
    pub material: Material,
    pub parent: Option<NodeId>,
    /// Whether pointer rays may resolve to this node.
    pub pickable: bool,
    pub visible: bool,
    pub layer: RenderLayer,
}

impl Node {
    pub fn new(
        label: &'static str,
        mesh: MeshId,
        transform: Transform,
        material: Material,
    ) -> Self {
        Self {
            label,
            mesh,
            transform,
            material,
            parent: None,
            pickable: false,
            visible: true,
            layer: RenderLayer::default(),
        }
    }

    pub fn on_layer(mut self, layer: RenderLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot storage with a free list.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Removes a node and returns it. Stale ids are ignored.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    node,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Composed transform of a node and all of its ancestors.
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.get(id)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// A node is drawn only if it and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(node) if node.visible => node.parent.map_or(true, |p| self.is_visible(p)),
            _ => false,
        }
    }
}
