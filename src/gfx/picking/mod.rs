//! # Tile Picking
//!
//! Turns pointer positions into tile hits and keeps hover/selection state.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: window pixels map to normalized device coordinates;
//!    anything outside `[-1, 1]` on either axis is a miss
//! 2. **NDC to Ray**: the inverse view-projection unprojects the near and far
//!    points into a world-space ray
//! 3. **Ray-Tile Intersection**: every tile quad is tested at its current
//!    height; the nearest hit wins, ties go to the lower tile index
//!
//! The scan is linear over all tiles. Rooms are a few hundred tiles, so this
//! stays well under a millisecond per pointer event.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::field::{TileKey, TileRecord};
use crate::gfx::camera::OrbitCamera;
use crate::gfx::scene::builder::TILE_EXTENT;
use crate::gfx::scene::{SceneHandle, TileVisual};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance to a horizontal square of half-size `half_extent` centred at `center`.
    pub fn intersect_tile(&self, center: Vector3<f32>, half_extent: f32) -> Option<f32> {
        if self.direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let t = (center.y - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }
        let hit = self.point_at(t);
        let inside =
            (hit.x - center.x).abs() <= half_extent && (hit.z - center.z).abs() <= half_extent;
        inside.then_some(t)
    }
}

/// Pointer position in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalized device coordinates for this pointer, `None` when it lies
    /// outside the viewport.
    pub fn to_ndc(&self, viewport: (u32, u32)) -> Option<(f32, f32)> {
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return None;
        }
        let ndc_x = (2.0 * self.x) / width as f32 - 1.0;
        let ndc_y = 1.0 - (2.0 * self.y) / height as f32; // Flip Y axis
        in_viewport((ndc_x, ndc_y)).then_some((ndc_x, ndc_y))
    }
}

fn in_viewport((x, y): (f32, f32)) -> bool {
    (-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y)
}

/// Result of a picking operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Index of the tile in [`SceneHandle::tiles`]
    pub tile_index: usize,
    pub key: TileKey,
    /// Distance from camera to intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Which tiles are currently hovered and selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickState {
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

/// World-space ray through a point in normalized device coordinates.
pub fn ray_from_ndc(ndc: (f32, f32), camera: &OrbitCamera) -> Option<Ray> {
    let inv_view_proj: Matrix4<f32> = camera.view_proj().invert()?;

    // wgpu clip space: near plane at z = 0, far plane at z = 1
    let unproject = |z: f32| {
        let world = inv_view_proj * Vector4::new(ndc.0, ndc.1, z, 1.0);
        Vector3::new(world.x / world.w, world.y / world.w, world.z / world.w)
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    let direction = far - near;
    if direction.magnitude2() <= f32::EPSILON {
        return None;
    }
    Some(Ray::new(near, direction))
}

/// Convert window coordinates to a world-space ray
pub fn screen_to_ray(
    pointer: &PointerEvent,
    viewport: (u32, u32),
    camera: &OrbitCamera,
) -> Option<Ray> {
    ray_from_ndc(pointer.to_ndc(viewport)?, camera)
}

/// Nearest tile hit by `ray`.
pub fn pick_with_ray(scene: &SceneHandle, ray: &Ray) -> Option<PickResult> {
    let half_extent = TILE_EXTENT / 2.0;
    let mut closest: Option<PickResult> = None;

    for (tile_index, tile) in scene.tiles().iter().enumerate() {
        let Some(center) = scene.tile_position(tile_index) else {
            continue;
        };
        let Some(distance) = ray.intersect_tile(center, half_extent) else {
            continue;
        };
        // strict comparison keeps the lower index on ties
        if closest.map_or(true, |best| distance < best.distance) {
            closest = Some(PickResult {
                tile_index,
                key: tile.key,
                distance,
                point: ray.point_at(distance),
            });
        }
    }

    closest
}

/// Nearest tile under a point in normalized device coordinates.
pub fn pick(scene: &SceneHandle, camera: &OrbitCamera, ndc: (f32, f32)) -> Option<PickResult> {
    if !in_viewport(ndc) {
        return None;
    }
    let ray = ray_from_ndc(ndc, camera)?;
    pick_with_ray(scene, &ray)
}

type HoverCallback = Box<dyn FnMut(&TileRecord, &PointerEvent)>;
type ClearHoverCallback = Box<dyn FnMut()>;
type SelectCallback = Box<dyn FnMut(&TileRecord)>;

/// Owns [`PickState`] and applies hover/selection visuals to the scene.
#[derive(Default)]
pub struct PickingController {
    state: PickState,
    on_hover: Option<HoverCallback>,
    on_clear_hover: Option<ClearHoverCallback>,
    on_select: Option<SelectCallback>,
}

impl PickingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PickState {
        self.state
    }

    pub fn set_on_hover(&mut self, callback: impl FnMut(&TileRecord, &PointerEvent) + 'static) {
        self.on_hover = Some(Box::new(callback));
    }

    pub fn set_on_clear_hover(&mut self, callback: impl FnMut() + 'static) {
        self.on_clear_hover = Some(Box::new(callback));
    }

    pub fn set_on_select(&mut self, callback: impl FnMut(&TileRecord) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    /// Updates hover state for a pointer move.
    pub fn pointer_move(
        &mut self,
        scene: &mut SceneHandle,
        camera: &OrbitCamera,
        viewport: (u32, u32),
        event: &PointerEvent,
    ) -> Option<PickResult> {
        let hit = event
            .to_ndc(viewport)
            .and_then(|ndc| pick(scene, camera, ndc));

        let Some(hit) = hit else {
            self.clear_hover(scene);
            if let Some(callback) = self.on_clear_hover.as_mut() {
                callback();
            }
            return None;
        };

        if self.state.hovered != Some(hit.tile_index) {
            self.clear_hover(scene);
            self.state.hovered = Some(hit.tile_index);
            if self.state.selected != Some(hit.tile_index) {
                scene.apply_tile_visual(hit.tile_index, TileVisual::Hover);
            }
        }

        if let (Some(callback), Some(record)) = (self.on_hover.as_mut(), scene.record(&hit.key)) {
            callback(record, event);
        }
        Some(hit)
    }

    /// Selects the tile under the pointer and recentres the camera on it.
    pub fn pointer_click(
        &mut self,
        scene: &mut SceneHandle,
        camera: &mut OrbitCamera,
        viewport: (u32, u32),
        event: &PointerEvent,
    ) -> Option<PickResult> {
        let ndc = event.to_ndc(viewport)?;
        let hit = pick(scene, camera, ndc)?;
        self.select(scene, camera, hit.tile_index);
        Some(hit)
    }

    /// Makes `tile_index` the single selected tile.
    pub fn select(&mut self, scene: &mut SceneHandle, camera: &mut OrbitCamera, tile_index: usize) {
        let Some(tile) = scene.tile(tile_index) else {
            return;
        };
        let key = tile.key;

        if let Some(previous) = self.state.selected {
            if previous != tile_index {
                self.release_selection(scene, previous);
            }
        }

        scene.apply_tile_visual(tile_index, TileVisual::Selected);
        scene.attach_ring(tile_index);
        self.state.selected = Some(tile_index);

        camera.retarget(Vector3::new(key.x as f32, 0.0, key.y as f32));
        log::debug!("selected tile {key}");

        if let (Some(callback), Some(record)) = (self.on_select.as_mut(), scene.record(&key)) {
            callback(record);
        }
    }

    pub fn clear_selection(&mut self, scene: &mut SceneHandle) {
        if let Some(previous) = self.state.selected {
            self.release_selection(scene, previous);
        }
    }

    fn release_selection(&mut self, scene: &mut SceneHandle, tile_index: usize) {
        scene.detach_ring(tile_index);
        let visual = if self.state.hovered == Some(tile_index) {
            TileVisual::Hover
        } else {
            TileVisual::Rest
        };
        scene.apply_tile_visual(tile_index, visual);
        self.state.selected = None;
    }

    fn clear_hover(&mut self, scene: &mut SceneHandle) {
        if let Some(previous) = self.state.hovered.take() {
            if self.state.selected != Some(previous) {
                scene.apply_tile_visual(previous, TileVisual::Rest);
            }
        }
    }
}
